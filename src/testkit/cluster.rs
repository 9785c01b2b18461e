//! In-memory cluster client.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Instance, InstanceKind, InstanceName};
use crate::error::{CollaboratorError, Result};
use crate::port::ClusterClient;

/// Cluster client backed by a map of running instances.
///
/// Applied manifests are recorded, not interpreted. Call counters let tests
/// assert which queries a use case made.
#[derive(Default)]
pub struct InMemoryCluster {
    instances: Mutex<BTreeMap<(InstanceKind, InstanceName), Instance>>,
    applied: Mutex<Vec<PathBuf>>,
    gets: AtomicUsize,
    lists: AtomicUsize,
    failure: Option<String>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster whose every call fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_instance(self, instance: Instance) -> Self {
        self.insert(instance);
        self
    }

    pub fn insert(&self, instance: Instance) {
        self.instances
            .lock()
            .insert((instance.kind, instance.name()), instance);
    }

    /// Number of `get_instance` calls made.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `list_instances` calls made.
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Manifests applied so far, in order.
    pub fn applied(&self) -> Vec<PathBuf> {
        self.applied.lock().clone()
    }

    fn check(&self, operation: &str) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(CollaboratorError::Cluster {
                operation: operation.to_string(),
                reason: reason.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn get_instance(
        &self,
        kind: InstanceKind,
        name: &InstanceName,
    ) -> Result<Option<Instance>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check("get")?;
        Ok(self.instances.lock().get(&(kind, name.clone())).cloned())
    }

    async fn list_instances(&self, kind: InstanceKind) -> Result<Vec<Instance>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.check("list")?;
        Ok(self
            .instances
            .lock()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, i)| i.clone())
            .collect())
    }

    async fn apply_manifest(&self, path: &Path) -> Result<()> {
        self.check("apply")?;
        self.applied.lock().push(path.to_path_buf());
        Ok(())
    }
}
