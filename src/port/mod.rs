//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define where the core meets the outside world. The topology
//! resolver and the migration engine only talk to these traits; adapters
//! implement them against kubectl, the local image repository and the
//! runtime process.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Cluster │            │  Metadata   │              │ Executor  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ClusterClient`] - Reads instances from and applies manifests to the orchestrator
//! - [`ImageMetadataReader`] - Resolves image references to their dependency metadata
//! - [`InstanceExecutor`] - Starts an instance (and its planned dependencies)
//! - [`ArtifactWriter`] - Persists routing artifacts for a later apply

pub mod outbound;

pub use outbound::artifacts::ArtifactWriter;
pub use outbound::cluster::ClusterClient;
pub use outbound::executor::{ExecutionMode, ExecutionRequest, InstanceExecutor};
pub use outbound::metadata::{ImageMetadataReader, ResolvedImage};
