//! Domain errors for argument parsing, topology resolution and routing.
//!
//! These errors are raised before any side effect happens: malformed
//! arguments are rejected before resolution starts, topology errors before
//! any instance is started, and routing errors before anything is written.
//!
//! # Examples
//!
//! ```
//! use cellmesh::domain::error::DomainError;
//! use cellmesh::domain::link::DependencyLink;
//!
//! let result = DependencyLink::parse("not a link");
//! assert!(matches!(result, Err(DomainError::MalformedArgument { .. })));
//! ```

use thiserror::Error;

use super::id::{Alias, InstanceName};
use super::instance::InstanceKind;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A link, environment variable or image string does not match its format.
    #[error("expects {expected}, received {argument}")]
    MalformedArgument {
        /// The offending string as given by the user.
        argument: String,
        /// Human-readable description of the expected format.
        expected: &'static str,
    },

    /// The same `(owner, alias)` pair was linked to two different instances.
    #[error("alias '{alias}' of instance {owner} is linked to both {first} and {second}")]
    ConflictingLink {
        /// Owning instance of the alias.
        owner: InstanceName,
        /// The alias linked twice.
        alias: Alias,
        /// Target of the first link.
        first: InstanceName,
        /// Target of the conflicting link.
        second: InstanceName,
    },

    /// A link references an alias the owning image does not declare.
    #[error("image {image} of instance {owner} does not declare a dependency alias '{alias}'")]
    UnknownAlias {
        /// Owning instance of the alias.
        owner: InstanceName,
        /// Image of the owning instance.
        image: String,
        /// The undeclared alias.
        alias: Alias,
    },

    /// A link is owned by an instance that is not started as part of this topology.
    #[error("link {owner}.{alias} targets instance {owner}, which is not started by this run")]
    DanglingLink {
        /// Owning instance named by the link.
        owner: InstanceName,
        /// The linked alias.
        alias: Alias,
    },

    /// The dependency graph revisits an image that is still being resolved.
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    CycleDetected {
        /// Image identities along the cycle, outermost first.
        path: Vec<String>,
    },

    /// A route target is of a different kind than the route variant expects.
    #[error("instance {instance} is a {actual}, but the route expects a {expected}")]
    RouteKindMismatch {
        /// The offending instance.
        instance: InstanceName,
        /// Kind required by the route variant.
        expected: InstanceKind,
        /// Kind found in the cluster.
        actual: InstanceKind,
    },

    /// Requested traffic percentage is outside `[0, 100]`.
    #[error("traffic percentage must be between 0 and 100, got {percentage}")]
    PercentageOutOfRange {
        /// The rejected percentage.
        percentage: i64,
    },

    /// The route source does not depend on the current target.
    #[error("instance {source_instance} does not depend on {target}")]
    NotADependency {
        /// Source instance of the route.
        source_instance: InstanceName,
        /// The current target it was expected to depend on.
        target: InstanceName,
    },

    /// An instance carries a dependency-ownership annotation that does not parse.
    #[error("instance {instance} has a malformed dependency annotation: {reason}")]
    InvalidAnnotation {
        /// The instance carrying the annotation.
        instance: InstanceName,
        /// Parser message.
        reason: String,
    },

    /// The new target lacks a component service exposed by the current target.
    #[error("instance {instance} does not expose component service '{service}'")]
    MissingService {
        /// The new target instance.
        instance: InstanceName,
        /// The missing component service.
        service: String,
    },
}
