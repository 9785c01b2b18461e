//! Traffic migration engine.
//!
//! Looks up the three instances of a route, validates the route and hands
//! the computed artifacts to an [`ArtifactWriter`]. Every check runs before
//! the writer is called, so a rejected migration leaves nothing behind.
//!
//! The engine does not lock anything in the cluster. Ownership copies keep
//! the `resourceVersion` they were read with, so applying a manifest built
//! from stale instances is rejected by the orchestrator.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::id::InstanceName;
use crate::domain::instance::Instance;
use crate::domain::route::{Percentage, Route, RoutingArtifacts};
use crate::error::{Error, Result};
use crate::port::{ArtifactWriter, ClusterClient};

/// One requested migration step.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub source: InstanceName,
    pub current: InstanceName,
    pub new: InstanceName,
    /// Share of traffic for the new target; checked against `0..=100`.
    pub percentage: i64,
    pub session_aware: bool,
}

pub struct TrafficMigrationEngine {
    cluster: Arc<dyn ClusterClient>,
}

impl TrafficMigrationEngine {
    pub fn new(cluster: Arc<dyn ClusterClient>) -> Self {
        Self { cluster }
    }

    /// Validate `request` and compute its artifacts without writing them.
    ///
    /// # Errors
    ///
    /// `PercentageOutOfRange` before any cluster read, then
    /// [`Error::TargetNotFound`] and the route validation errors.
    pub async fn plan(&self, request: &RouteRequest) -> Result<RoutingArtifacts> {
        let percentage = Percentage::new(request.percentage)?;

        let source = self.lookup(&request.source).await?;
        let current = self.lookup(&request.current).await?;
        let new = self.lookup(&request.new).await?;

        let route = Route::new(source, current, new);
        route.check()?;
        debug!(
            source = %request.source,
            source_kind = %route.source_kind(),
            target_kind = %route.target_kind(),
            "Route validated"
        );

        Ok(route.build(percentage, request.session_aware)?)
    }

    /// Validate `request`, compute its artifacts and write them.
    pub async fn migrate(
        &self,
        request: &RouteRequest,
        writer: &dyn ArtifactWriter,
    ) -> Result<RoutingArtifacts> {
        let artifacts = self.plan(request).await?;
        writer.write(&artifacts)?;

        info!(
            source = %request.source,
            current = %request.current,
            new = %request.new,
            percentage = request.percentage,
            session_aware = request.session_aware,
            ownership = artifacts.changes_ownership(),
            "Routing artifacts written"
        );
        Ok(artifacts)
    }

    async fn lookup(&self, name: &InstanceName) -> Result<Instance> {
        self.cluster
            .find_instance(name)
            .await?
            .ok_or_else(|| Error::TargetNotFound {
                instance: name.clone(),
            })
    }
}
