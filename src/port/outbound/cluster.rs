//! Cluster client port.
//!
//! The cluster client is the only component that reads or mutates
//! orchestrator-visible state. Writes go through [`ClusterClient::apply_manifest`]
//! and must be idempotent: applying the same manifest twice is a no-op.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::id::InstanceName;
use crate::domain::image::ImageIdentity;
use crate::domain::instance::{Instance, InstanceKind};
use crate::error::Result;

/// Read and apply access to the container orchestrator.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the topology resolver queries the
/// cluster from concurrent tasks.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Get a running instance of `kind` by name, `None` when it does not exist.
    async fn get_instance(&self, kind: InstanceKind, name: &InstanceName)
        -> Result<Option<Instance>>;

    /// List every running instance of `kind`.
    async fn list_instances(&self, kind: InstanceKind) -> Result<Vec<Instance>>;

    /// Apply a multi-document manifest.
    async fn apply_manifest(&self, path: &Path) -> Result<()>;

    /// Look an instance up under either kind, cells first.
    async fn find_instance(&self, name: &InstanceName) -> Result<Option<Instance>> {
        for kind in InstanceKind::ALL {
            if let Some(instance) = self.get_instance(kind, name).await? {
                return Ok(Some(instance));
            }
        }
        Ok(None)
    }

    /// First running instance of an image, used for sharing equivalent instances.
    async fn find_running(&self, identity: &ImageIdentity) -> Result<Option<Instance>> {
        for kind in InstanceKind::ALL {
            let found = self
                .list_instances(kind)
                .await?
                .into_iter()
                .find(|i| i.image().as_ref() == Some(identity));
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}
