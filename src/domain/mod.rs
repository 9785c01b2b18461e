//! Runtime-agnostic domain types: images, links, instances, topology, routes.

pub mod error;
pub mod id;
pub mod image;
pub mod instance;
pub mod link;
pub mod route;
pub mod topology;

pub use error::DomainError;
pub use id::{Alias, InstanceName};
pub use image::{ImageIdentity, ImageMetadata, ImageReference};
pub use instance::{DependencyReference, Instance, InstanceKind};
pub use link::{DependencyLink, EnvironmentVariable};
pub use route::{Percentage, Route, RoutingArtifacts};
pub use topology::{DependencyInfo, InstanceNode, NodeId, NodeOrigin, PlannedInstance, Topology};
