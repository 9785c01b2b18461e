//! Instance executor port.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::id::{Alias, InstanceName};
use crate::domain::topology::{DependencyInfo, PlannedInstance};
use crate::error::Result;

/// Whether the instance is started for serving or for running its tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Run,
    Test,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Everything the runtime needs to start a root instance.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub mode: ExecutionMode,
    /// The root instance, as dependency information with `is_root` set.
    pub root: DependencyInfo,
    pub image_dir: PathBuf,
    /// Scoped environment variables, in order.
    pub env: Vec<(String, String)>,
    /// Alias to dependency instance for the root's resolved aliases.
    pub dependencies: BTreeMap<Alias, DependencyInfo>,
    /// Root aliases left unbound; required ones fail at instance start.
    pub unresolved: Vec<Alias>,
    /// Instances the runtime starts, root first.
    pub instances: Vec<InstanceName>,
    /// The whole resolved tree, one entry per node, root first.
    pub tree: Vec<PlannedInstance>,
    pub start_dependencies: bool,
    pub share_dependencies: bool,
}

/// Starts instances through the application runtime.
#[async_trait]
pub trait InstanceExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<()>;
}
