//! Dependency topology resolution.

pub mod resolver;

pub use resolver::{ResolveRequest, ResolvedTopology, TopologyResolver, DEFAULT_MAX_CONCURRENCY};
