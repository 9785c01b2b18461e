//! Outbound adapters: kubectl, the local image repository, the runtime
//! process and the manifest file.

pub mod kubectl;
pub mod manifest;
pub mod process;
pub mod repository;

pub use kubectl::KubectlCluster;
pub use manifest::ManifestWriter;
pub use process::ProcessExecutor;
pub use repository::LocalRepository;
