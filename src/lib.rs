//! Cellmesh - dependency-aware instance launches and canary traffic migration
//! for cell-based application runtimes.
//!
//! Packaged images are started as named instances. An instance's declared
//! dependencies are bound to running instances through links, started on
//! demand, or shared with equivalent running instances. Traffic between two
//! versions of a dependency is shifted gradually through weighted routing
//! rules, with the ownership annotation cut over at 100%.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Images, links, instances, the topology arena and routes
//! - **`port`** - Traits for the cluster, image metadata, runtime and manifests
//! - **`application`** - Topology resolver, environment scoper, migration
//!   engine and the run/test use case
//! - **`adapter`** - kubectl, local repository, runtime process, manifest
//!   file and the CLI
//! - **`infrastructure`** - Configuration, logging and wiring
//!
//! # Modules
//!
//! - [`domain`] - Runtime-agnostic types and invariants
//! - [`error`] - Error types for the crate
//! - [`port`] - Collaborator traits
//! - [`application`] - Use cases
//! - [`adapter`] - Port implementations and the CLI
//! - [`infrastructure`] - Configuration loading and composition root
//!
//! # Features
//!
//! - `testkit` - In-memory collaborators and builders for tests
//!
//! # Example
//!
//! ```
//! use cellmesh::domain::link::parse_links;
//! use cellmesh::domain::InstanceName;
//!
//! let root = InstanceName::new("hr-inst");
//! let links = parse_links(&["employee:employee-inst", "hr-inst.stock:stock-inst"], &root).unwrap();
//! assert!(links.iter().all(|l| l.is_root_owned()));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
