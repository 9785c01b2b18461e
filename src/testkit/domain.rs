//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`ImageMetadata`], [`Instance`]
//! and [`DependencyLink`] so tests focus on assertions rather than
//! construction boilerplate.

use std::collections::BTreeMap;

use crate::domain::{
    Alias, DependencyLink, DependencyReference, ImageIdentity, ImageMetadata, Instance,
    InstanceKind, InstanceName,
};

/// Image metadata `org/{name}:{version}` with one component named after the image.
pub fn image(name: &str, version: &str) -> ImageMetadata {
    ImageMetadata {
        organization: "org".to_string(),
        name: name.to_string(),
        version: version.to_string(),
        components: vec![name.to_string()],
        dependencies: BTreeMap::new(),
    }
}

/// Image metadata declaring `dependencies` under the given aliases.
pub fn image_with(name: &str, version: &str, dependencies: &[(&str, ImageMetadata)]) -> ImageMetadata {
    let mut metadata = image(name, version);
    metadata.dependencies = dependencies
        .iter()
        .map(|(alias, dep)| (Alias::new(*alias), dep.clone()))
        .collect();
    metadata
}

/// Create an [`InstanceName`] from a string.
pub fn instance_name(name: &str) -> InstanceName {
    InstanceName::new(name)
}

/// Parse a link, panicking on malformed input.
pub fn link(raw: &str) -> DependencyLink {
    DependencyLink::parse(raw).expect("valid link")
}

/// A running cell of image `org/{image}:{version}`.
pub fn cell(name: &str, image: &str, version: &str) -> Instance {
    Instance::new(
        InstanceKind::Cell,
        &InstanceName::new(name),
        &ImageIdentity::new("org", image, version),
    )
}

/// A running composite of image `org/{image}:{version}` exposing `services`.
pub fn composite(name: &str, image: &str, version: &str, services: &[&str]) -> Instance {
    Instance::new(
        InstanceKind::Composite,
        &InstanceName::new(name),
        &ImageIdentity::new("org", image, version),
    )
    .with_services(services.iter().copied())
}

/// Ownership entry saying the holder reaches `target` under `alias`.
pub fn owns(target: &Instance, alias: &str) -> DependencyReference {
    let image = target
        .image()
        .unwrap_or_else(|| ImageIdentity::new("org", "unknown", "0.0.0"));
    DependencyReference {
        instance: target.name(),
        org: image.organization,
        name: image.name,
        version: image.version,
        alias: Alias::new(alias),
        kind: target.kind,
    }
}
