//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod environment;
pub mod launch;
pub mod routing;
pub mod topology;

pub use environment::{scope_environment, ScopedVariable};
pub use launch::{LaunchRequest, Launcher};
pub use routing::{RouteRequest, TrafficMigrationEngine};
pub use topology::{ResolveRequest, ResolvedTopology, TopologyResolver};
