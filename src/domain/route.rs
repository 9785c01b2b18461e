//! Traffic routes between a source instance and two target versions.
//!
//! A [`Route`] is one of four variants keyed by the kinds of its source and
//! targets. All variants share [`Route::check`] and [`Route::build`]; the
//! variant only decides which label selects the source workloads, how the
//! targets are addressed and which kind the rewritten ownership entry gets.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::DomainError;
use super::id::InstanceName;
use super::instance::{Instance, InstanceKind, ORIGINAL_SERVICES_ANNOTATION};

const RULE_API_VERSION: &str = "networking.istio.io/v1alpha3";
const RULE_KIND: &str = "VirtualService";
/// Header used to pin a session to one target version.
pub const SESSION_HEADER: &str = "x-instance-id";

/// Traffic share toward the new target, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(u8);

impl Percentage {
    pub const FULL: Percentage = Percentage(100);

    /// # Errors
    ///
    /// Returns [`DomainError::PercentageOutOfRange`] outside `[0, 100]`.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(p) if p <= 100 => Ok(Self(p)),
            _ => Err(DomainError::PercentageOutOfRange { percentage: value }),
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Share left on the current target.
    #[must_use]
    pub const fn remainder(self) -> u8 {
        100 - self.0
    }

    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 == 100
    }
}

/// The three instances a route connects.
#[derive(Debug, Clone)]
pub struct RouteEnds {
    pub source: Instance,
    pub current: Instance,
    pub new: Instance,
}

/// A route, tagged by `(source kind, target kind)`.
#[derive(Debug, Clone)]
pub enum Route {
    CellToCell(RouteEnds),
    CellToComposite(RouteEnds),
    CompositeToCell(RouteEnds),
    CompositeToComposite(RouteEnds),
}

impl Route {
    /// Pick the variant from the kinds of the source and the current target.
    ///
    /// The new target is validated against that variant by [`Route::check`].
    #[must_use]
    pub fn new(source: Instance, current: Instance, new: Instance) -> Self {
        let ends = RouteEnds {
            source,
            current,
            new,
        };
        match (ends.source.kind, ends.current.kind) {
            (InstanceKind::Cell, InstanceKind::Cell) => Self::CellToCell(ends),
            (InstanceKind::Cell, InstanceKind::Composite) => Self::CellToComposite(ends),
            (InstanceKind::Composite, InstanceKind::Cell) => Self::CompositeToCell(ends),
            (InstanceKind::Composite, InstanceKind::Composite) => Self::CompositeToComposite(ends),
        }
    }

    #[must_use]
    pub fn ends(&self) -> &RouteEnds {
        match self {
            Self::CellToCell(ends)
            | Self::CellToComposite(ends)
            | Self::CompositeToCell(ends)
            | Self::CompositeToComposite(ends) => ends,
        }
    }

    #[must_use]
    pub fn source_kind(&self) -> InstanceKind {
        match self {
            Self::CellToCell(_) | Self::CellToComposite(_) => InstanceKind::Cell,
            Self::CompositeToCell(_) | Self::CompositeToComposite(_) => InstanceKind::Composite,
        }
    }

    #[must_use]
    pub fn target_kind(&self) -> InstanceKind {
        match self {
            Self::CellToCell(_) | Self::CompositeToCell(_) => InstanceKind::Cell,
            Self::CellToComposite(_) | Self::CompositeToComposite(_) => InstanceKind::Composite,
        }
    }

    /// Validate instance kinds, the ownership relation and service coverage.
    ///
    /// # Errors
    ///
    /// [`DomainError::RouteKindMismatch`], [`DomainError::NotADependency`],
    /// [`DomainError::InvalidAnnotation`] or [`DomainError::MissingService`].
    pub fn check(&self) -> Result<(), DomainError> {
        let ends = self.ends();
        for (instance, expected) in [
            (&ends.source, self.source_kind()),
            (&ends.current, self.target_kind()),
            (&ends.new, self.target_kind()),
        ] {
            if instance.kind != expected {
                return Err(DomainError::RouteKindMismatch {
                    instance: instance.name(),
                    expected,
                    actual: instance.kind,
                });
            }
        }

        let current = ends.current.name();
        let depends = source_dependencies(&ends.source)?
            .iter()
            .any(|d| d.instance == current);
        if !depends {
            return Err(DomainError::NotADependency {
                source_instance: ends.source.name(),
                target: current,
            });
        }

        if self.target_kind() == InstanceKind::Composite {
            let offered = ends.new.component_services();
            if let Some(missing) = ends
                .current
                .component_services()
                .into_iter()
                .find(|s| !offered.contains(s))
            {
                return Err(DomainError::MissingService {
                    instance: ends.new.name(),
                    service: missing,
                });
            }
        }

        Ok(())
    }

    /// Compute the artifacts for shifting `percentage` of traffic to the new target.
    ///
    /// Partial shifts only produce the routing rule. A full shift also
    /// produces the rewritten source and the new target carrying the current
    /// target's service names.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidAnnotation`] when the source annotation does not parse.
    pub fn build(
        &self,
        percentage: Percentage,
        session_aware: bool,
    ) -> Result<RoutingArtifacts, DomainError> {
        let rule = self.routing_rule(percentage, session_aware);
        if !percentage.is_full() {
            return Ok(RoutingArtifacts {
                rule,
                source: None,
                target: None,
            });
        }

        Ok(RoutingArtifacts {
            rule,
            source: Some(self.rewritten_source()?),
            target: Some(self.forwarded_target()),
        })
    }

    fn host_pairs(&self) -> Vec<(String, String)> {
        let ends = self.ends();
        match self.target_kind() {
            InstanceKind::Cell => ends
                .current
                .service_hosts()
                .into_iter()
                .zip(ends.new.service_hosts())
                .collect(),
            InstanceKind::Composite => ends
                .current
                .component_services()
                .iter()
                .map(|c| (ends.current.component_host(c), ends.new.component_host(c)))
                .collect(),
        }
    }

    fn routing_rule(&self, percentage: Percentage, session_aware: bool) -> RoutingRule {
        let ends = self.ends();
        let mut source_labels = BTreeMap::new();
        source_labels.insert(
            self.source_kind().source_label().to_string(),
            ends.source.metadata.name.clone(),
        );

        let pairs = self.host_pairs();
        let mut http = Vec::with_capacity(pairs.len() * if session_aware { 3 } else { 1 });
        for (current, new) in &pairs {
            let matcher = |header: Option<&str>| {
                let mut headers = BTreeMap::new();
                if let Some(value) = header {
                    headers.insert(SESSION_HEADER.to_string(), StringMatch::Exact(value.to_string()));
                }
                RouteMatch {
                    authority: StringMatch::Prefix(current.clone()),
                    source_labels: source_labels.clone(),
                    headers,
                }
            };

            if session_aware {
                http.push(HttpRoute {
                    matches: vec![matcher(Some("1"))],
                    route: vec![WeightedDestination::new(current, 100)],
                });
                http.push(HttpRoute {
                    matches: vec![matcher(Some("2"))],
                    route: vec![WeightedDestination::new(new, 100)],
                });
            }
            http.push(HttpRoute {
                matches: vec![matcher(None)],
                route: vec![
                    WeightedDestination::new(current, percentage.remainder()),
                    WeightedDestination::new(new, percentage.value()),
                ],
            });
        }

        RoutingRule {
            api_version: RULE_API_VERSION.to_string(),
            kind: RULE_KIND.to_string(),
            metadata: RuleMetadata {
                name: format!("{}--vs", ends.source.metadata.name),
            },
            spec: RoutingSpec {
                hosts: pairs.into_iter().map(|(current, _)| current).collect(),
                http,
            },
        }
    }

    fn rewritten_source(&self) -> Result<Instance, DomainError> {
        let ends = self.ends();
        let current = ends.current.name();
        let new_name = ends.new.name();
        let new_image = ends.new.image();

        let mut dependencies = source_dependencies(&ends.source)?;
        for dep in dependencies.iter_mut().filter(|d| d.instance == current) {
            dep.instance = new_name.clone();
            dep.kind = self.target_kind();
            if let Some(image) = &new_image {
                dep.org = image.organization.clone();
                dep.name = image.name.clone();
                dep.version = image.version.clone();
            }
        }

        let mut source = ends.source.clone();
        source.set_dependencies(&dependencies);
        Ok(source)
    }

    fn forwarded_target(&self) -> Instance {
        let ends = self.ends();
        // Carry the services of the very first version through chained cutovers.
        let services = ends
            .current
            .metadata
            .annotations
            .get(ORIGINAL_SERVICES_ANNOTATION)
            .cloned()
            .unwrap_or_else(|| ends.current.component_services().join(","));

        let mut target = ends.new.clone();
        target
            .metadata
            .annotations
            .insert(ORIGINAL_SERVICES_ANNOTATION.to_string(), services);
        target
    }
}

fn source_dependencies(
    source: &Instance,
) -> Result<Vec<super::instance::DependencyReference>, DomainError> {
    source
        .dependencies()
        .map_err(|e| DomainError::InvalidAnnotation {
            instance: InstanceName::new(&source.metadata.name),
            reason: e.to_string(),
        })
}

/// Artifacts produced by one migration step, in write order.
#[derive(Debug, Clone)]
pub struct RoutingArtifacts {
    pub rule: RoutingRule,
    /// Source with its ownership annotation pointing at the new target.
    pub source: Option<Instance>,
    /// New target recording the services of the superseded target.
    pub target: Option<Instance>,
}

impl RoutingArtifacts {
    /// Whether this step changes dependency ownership.
    #[must_use]
    pub fn changes_ownership(&self) -> bool {
        self.source.is_some()
    }
}

/// Weighted traffic-split rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    pub api_version: String,
    pub kind: String,
    pub metadata: RuleMetadata,
    pub spec: RoutingSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingSpec {
    pub hosts: Vec<String>,
    pub http: Vec<HttpRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpRoute {
    #[serde(rename = "match")]
    pub matches: Vec<RouteMatch>,
    pub route: Vec<WeightedDestination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    pub authority: StringMatch,
    pub source_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, StringMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatch {
    Exact(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedDestination {
    pub destination: Destination,
    pub weight: u8,
}

impl WeightedDestination {
    fn new(host: &str, weight: u8) -> Self {
        Self {
            destination: Destination {
                host: host.to_string(),
            },
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub host: String,
}
