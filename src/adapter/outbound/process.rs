//! Instance executor that hands the resolved topology to the runtime binary.
//!
//! The runtime is invoked as
//! `<program> [args...] <mode> <root-json> <dependencies-json> <unresolved-json> <tree-json> <start> <share>`
//! with the scoped variables added to its environment. The tree lists every
//! node the resolver planned, so the runtime starts nested and shared
//! dependencies under the names chosen here.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::{CollaboratorError, Result};
use crate::port::{ExecutionRequest, InstanceExecutor};

#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Positional arguments describing `request`, after the configured ones.
    ///
    /// # Errors
    ///
    /// JSON serialization errors.
    pub fn runtime_args(request: &ExecutionRequest) -> Result<Vec<String>> {
        Ok(vec![
            request.mode.to_string(),
            serde_json::to_string(&request.root)?,
            serde_json::to_string(&request.dependencies)?,
            serde_json::to_string(&request.unresolved)?,
            serde_json::to_string(&request.tree)?,
            request.start_dependencies.to_string(),
            request.share_dependencies.to_string(),
        ])
    }
}

#[async_trait]
impl InstanceExecutor for ProcessExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<()> {
        let instance = request.root.instance_name.clone();
        let failed = |reason: String| CollaboratorError::Executor {
            instance: instance.clone(),
            reason,
        };

        let status = Command::new(&self.program)
            .args(&self.args)
            .args(Self::runtime_args(request)?)
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .await
            .map_err(|e| failed(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(failed(format!("{} exited with {status}", self.program)).into());
        }
        info!(instance = %request.root.instance_name, mode = %request.mode, "Runtime finished");
        Ok(())
    }
}
