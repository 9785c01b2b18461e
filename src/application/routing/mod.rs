//! Traffic migration between two versions of a dependency.

pub mod engine;

pub use engine::{RouteRequest, TrafficMigrationEngine};
