//! Artifact writer port.

use crate::domain::route::RoutingArtifacts;
use crate::error::Result;

/// Persists the artifacts of one migration step.
///
/// Writing must be all-or-nothing from the caller's point of view: either
/// every document of `artifacts` is persisted or the call fails.
pub trait ArtifactWriter: Send + Sync {
    fn write(&self, artifacts: &RoutingArtifacts) -> Result<()>;
}
