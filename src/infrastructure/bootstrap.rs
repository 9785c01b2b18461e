//! Composition root: builds adapters and use cases from configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::adapter::outbound::{KubectlCluster, LocalRepository, ManifestWriter, ProcessExecutor};
use crate::application::launch::Launcher;
use crate::application::routing::TrafficMigrationEngine;
use crate::application::topology::TopologyResolver;
use crate::infrastructure::config::settings::Config;
use crate::port::ClusterClient;

/// Cluster client for the configured kubectl binary and namespace.
pub fn cluster_client(config: &Config) -> Arc<dyn ClusterClient> {
    Arc::new(KubectlCluster::new(
        config.cluster.kubectl.clone(),
        config.cluster.namespace.clone(),
    ))
}

/// Run/test use case wired to the local repository and runtime process.
pub fn launcher(config: &Config, cluster: Arc<dyn ClusterClient>) -> Launcher {
    debug!(
        repository = %config.repository.path.display(),
        program = %config.executor.program,
        "Wiring launcher"
    );
    let resolver = TopologyResolver::new(
        Arc::new(LocalRepository::new(config.repository.path.clone())),
        cluster,
    )
    .with_max_concurrency(config.resolver.max_concurrency);
    let executor = ProcessExecutor::new(
        config.executor.program.clone(),
        config.executor.args.clone(),
    );
    Launcher::new(resolver, Arc::new(executor))
}

pub fn migration_engine(cluster: Arc<dyn ClusterClient>) -> TrafficMigrationEngine {
    TrafficMigrationEngine::new(cluster)
}

/// Manifest writer for `output`, or the configured default manifest.
pub fn manifest_writer(config: &Config, output: Option<&Path>) -> ManifestWriter {
    ManifestWriter::new(output.unwrap_or(config.routing.manifest.as_path()))
}
