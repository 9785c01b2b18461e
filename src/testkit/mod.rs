//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: builders for image metadata, instances and links.
//! - [`cluster`]: `InMemoryCluster`, a [`ClusterClient`](crate::port::ClusterClient) over a map.
//! - [`metadata`]: `StaticMetadataReader`, an image repository held in memory.
//! - [`executor`]: `RecordingExecutor`, which records execution requests.
//! - [`writer`]: `MemoryWriter`, which keeps written routing artifacts.

pub mod cluster;
pub mod domain;
pub mod executor;
pub mod metadata;
pub mod writer;
