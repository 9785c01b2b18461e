//! Collaborator configuration: image repository, cluster, executor, resolver
//! and routing output.

use std::path::PathBuf;

use serde::Deserialize;

use crate::application::topology::DEFAULT_MAX_CONCURRENCY;

/// Environment variable overriding the repository location.
pub const REPOSITORY_ENV: &str = "CELLMESH_REPOSITORY";

/// Local image repository configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Root of the extracted image repository.
    ///
    /// Defaults to `~/.cellmesh/repo`.
    #[serde(default = "default_repository_path")]
    pub path: PathBuf,
}

fn default_repository_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cellmesh")
        .join("repo")
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: default_repository_path(),
        }
    }
}

/// Cluster access through `kubectl`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Path or name of the kubectl binary.
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
    /// Namespace passed to every call; kubectl's current context when unset.
    #[serde(default)]
    pub namespace: Option<String>,
}

fn default_kubectl() -> String {
    "kubectl".into()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubectl: default_kubectl(),
            namespace: None,
        }
    }
}

/// Runtime process that starts instances.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the generated ones.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "cellmesh-runtime".into()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

/// Topology resolver tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Maximum concurrent cluster and metadata lookups (default: 8).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Routing output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Manifest routing artifacts are appended to (default: `routes.yaml`).
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("routes.yaml")
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}
