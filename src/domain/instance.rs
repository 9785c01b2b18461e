//! Cluster-side view of running instances.
//!
//! Instances are kept close to the object the orchestrator returns: object
//! metadata with an ordered annotation map and an opaque `spec` document.
//! Accessors derive the parts the routing engine needs (image identity,
//! dependency-ownership annotation, exposed services). Metadata fields the
//! crate does not model (labels, namespace, owner references and the like)
//! are carried through untouched, so a modified copy applies without losing
//! them. `status` is dropped on purpose: it belongs to the controller and is
//! never part of an applied manifest.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{Alias, InstanceName};
use super::image::ImageIdentity;

/// API version of the runtime's custom resources.
pub const API_VERSION: &str = "mesh.cellmesh.io/v1alpha2";

pub const IMAGE_ORG_ANNOTATION: &str = "mesh.cellmesh.io/cell-image-org";
pub const IMAGE_NAME_ANNOTATION: &str = "mesh.cellmesh.io/cell-image-name";
pub const IMAGE_VERSION_ANNOTATION: &str = "mesh.cellmesh.io/cell-image-version";
/// JSON list of [`DependencyReference`] recording what an instance depends on.
pub const DEPENDENCIES_ANNOTATION: &str = "mesh.cellmesh.io/cell-dependencies";
/// Comma separated component services copied forward on full cutover.
pub const ORIGINAL_SERVICES_ANNOTATION: &str = "mesh.cellmesh.io/original-component-svcs";

/// The two supported instance kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InstanceKind {
    Cell,
    Composite,
}

impl InstanceKind {
    /// Both kinds, in lookup order.
    pub const ALL: [InstanceKind; 2] = [InstanceKind::Cell, InstanceKind::Composite];

    /// Plural resource name used by `get`/`delete` style calls.
    #[must_use]
    pub const fn resource_plural(self) -> &'static str {
        match self {
            Self::Cell => "cells",
            Self::Composite => "composites",
        }
    }

    /// Label selecting workloads of a source instance of this kind.
    #[must_use]
    pub const fn source_label(self) -> &'static str {
        match self {
            Self::Cell => "mesh.cellmesh.io/cell",
            Self::Composite => "mesh.cellmesh.io/composite",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// Object metadata of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Version read from the cluster; kept on modified copies so a concurrent
    /// modification makes the apply fail instead of silently winning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    /// Every other metadata field, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of the dependency-ownership annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReference {
    pub instance: InstanceName,
    pub org: String,
    pub name: String,
    pub version: String,
    pub alias: Alias,
    pub kind: InstanceKind,
}

impl DependencyReference {
    #[must_use]
    pub fn identity(&self) -> ImageIdentity {
        ImageIdentity::new(&self.org, &self.name, &self.version)
    }
}

/// A running instance as read from the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub api_version: String,
    pub kind: InstanceKind,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl Instance {
    /// Build a minimal instance object, mostly for tests and fixtures.
    #[must_use]
    pub fn new(kind: InstanceKind, name: &InstanceName, image: &ImageIdentity) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(IMAGE_ORG_ANNOTATION.to_string(), image.organization.clone());
        annotations.insert(IMAGE_NAME_ANNOTATION.to_string(), image.name.clone());
        annotations.insert(IMAGE_VERSION_ANNOTATION.to_string(), image.version.clone());
        Self {
            api_version: API_VERSION.to_string(),
            kind,
            metadata: ObjectMeta {
                name: name.to_string(),
                annotations,
                ..ObjectMeta::default()
            },
            spec: serde_json::json!({ "servicesTemplates": [] }),
        }
    }

    /// Attach component services (`spec.servicesTemplates`).
    #[must_use]
    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let templates: Vec<_> = services
            .into_iter()
            .map(|s| serde_json::json!({ "metadata": { "name": s.into() } }))
            .collect();
        self.spec = serde_json::json!({ "servicesTemplates": templates });
        self
    }

    /// Replace the dependency-ownership annotation.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: &[DependencyReference]) -> Self {
        self.set_dependencies(dependencies);
        self
    }

    #[must_use]
    pub fn name(&self) -> InstanceName {
        InstanceName::new(&self.metadata.name)
    }

    /// Image identity from the image annotations, if all three are present.
    #[must_use]
    pub fn image(&self) -> Option<ImageIdentity> {
        let annotations = &self.metadata.annotations;
        Some(ImageIdentity::new(
            annotations.get(IMAGE_ORG_ANNOTATION)?,
            annotations.get(IMAGE_NAME_ANNOTATION)?,
            annotations.get(IMAGE_VERSION_ANNOTATION)?,
        ))
    }

    /// Parsed dependency-ownership annotation. Missing means no dependencies.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the annotation is present but malformed.
    pub fn dependencies(&self) -> Result<Vec<DependencyReference>, serde_json::Error> {
        match self.metadata.annotations.get(DEPENDENCIES_ANNOTATION) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw),
            _ => Ok(Vec::new()),
        }
    }

    pub fn set_dependencies(&mut self, dependencies: &[DependencyReference]) {
        // Serializing plain strings and enums into JSON cannot fail.
        let raw = serde_json::to_string(dependencies).unwrap_or_else(|_| "[]".to_string());
        self.metadata
            .annotations
            .insert(DEPENDENCIES_ANNOTATION.to_string(), raw);
    }

    /// Names of the component services declared in `spec.servicesTemplates`.
    #[must_use]
    pub fn component_services(&self) -> Vec<String> {
        self.spec
            .get("servicesTemplates")
            .and_then(|v| v.as_array())
            .map(|templates| {
                templates
                    .iter()
                    .filter_map(|t| t.pointer("/metadata/name").and_then(|n| n.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Host name of one component service of this instance.
    #[must_use]
    pub fn component_host(&self, component: &str) -> String {
        format!("{}--{}-service", self.metadata.name, component)
    }

    /// Hosts other instances use to reach this one.
    ///
    /// Cells are reached through their gateway; composites expose every
    /// component service directly.
    #[must_use]
    pub fn service_hosts(&self) -> Vec<String> {
        match self.kind {
            InstanceKind::Cell => vec![format!("{}--gateway-service", self.metadata.name)],
            InstanceKind::Composite => self
                .component_services()
                .iter()
                .map(|c| self.component_host(c))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Instance {
        Instance::new(
            InstanceKind::Composite,
            &InstanceName::new("stock-v1"),
            &ImageIdentity::new("org", "stock", "1.0.0"),
        )
        .with_services(["quotes", "ledger"])
    }

    #[test]
    fn unmodelled_metadata_survives_a_round_trip() {
        let raw = serde_json::json!({
            "apiVersion": API_VERSION,
            "kind": "Cell",
            "metadata": {
                "name": "portal",
                "namespace": "prod",
                "labels": {"team": "pay"},
                "uid": "6f1c",
                "ownerReferences": [{"kind": "Deployment", "name": "portal-owner"}],
                "resourceVersion": "7"
            },
            "spec": {"gatewayTemplate": {}},
            "status": {"status": "Ready"}
        });

        let instance: Instance = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(instance.metadata.resource_version.as_deref(), Some("7"));

        let back = serde_json::to_value(&instance).unwrap();
        assert_eq!(back["metadata"], raw["metadata"]);
        assert_eq!(back["spec"], raw["spec"]);
        assert!(back.get("status").is_none());
    }

    #[test]
    fn image_identity_comes_from_annotations() {
        assert_eq!(
            stock().image(),
            Some(ImageIdentity::new("org", "stock", "1.0.0"))
        );
    }

    #[test]
    fn composite_hosts_are_per_component() {
        assert_eq!(
            stock().service_hosts(),
            ["stock-v1--quotes-service", "stock-v1--ledger-service"]
        );
    }

    #[test]
    fn cell_host_is_the_gateway() {
        let cell = Instance::new(
            InstanceKind::Cell,
            &InstanceName::new("hr"),
            &ImageIdentity::new("org", "hr", "1.0.0"),
        );
        assert_eq!(cell.service_hosts(), ["hr--gateway-service"]);
    }

    #[test]
    fn dependencies_round_trip_through_annotation() {
        let dep = DependencyReference {
            instance: InstanceName::new("stock-v1"),
            org: "org".into(),
            name: "stock".into(),
            version: "1.0.0".into(),
            alias: Alias::new("stock"),
            kind: InstanceKind::Composite,
        };
        let instance = stock().with_dependencies(std::slice::from_ref(&dep));
        assert_eq!(instance.dependencies().unwrap(), vec![dep]);
    }

    #[test]
    fn missing_dependency_annotation_means_none() {
        assert!(stock().dependencies().unwrap().is_empty());
    }

    #[test]
    fn deserializes_cluster_object() {
        let json = r#"{
            "apiVersion": "mesh.cellmesh.io/v1alpha2",
            "kind": "Cell",
            "metadata": {
                "name": "hr",
                "resourceVersion": "42",
                "annotations": {"mesh.cellmesh.io/cell-image-org": "org"}
            },
            "spec": {"servicesTemplates": [{"metadata": {"name": "hr"}}]}
        }"#;
        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.kind, InstanceKind::Cell);
        assert_eq!(instance.metadata.resource_version.as_deref(), Some("42"));
        assert_eq!(instance.component_services(), ["hr"]);
        assert!(instance.image().is_none());
    }
}
