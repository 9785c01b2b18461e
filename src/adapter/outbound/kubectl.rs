//! Cluster client backed by the `kubectl` binary.
//!
//! Reads use `kubectl get ... -o json`; writes use `kubectl apply -f`.
//! Failed invocations surface as [`CollaboratorError::Cluster`] with the
//! command's stderr. Nothing is retried.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::id::InstanceName;
use crate::domain::instance::{Instance, InstanceKind};
use crate::error::{CollaboratorError, Result};
use crate::port::ClusterClient;

/// `kubectl get <plural> -o json` output.
#[derive(Debug, Deserialize)]
struct InstanceList {
    #[serde(default)]
    items: Vec<Instance>,
}

#[derive(Debug, Clone)]
pub struct KubectlCluster {
    program: String,
    namespace: Option<String>,
}

impl KubectlCluster {
    pub fn new(program: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            program: program.into(),
            namespace,
        }
    }

    async fn kubectl(&self, operation: &str, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(namespace) = &self.namespace {
            command.args(["--namespace", namespace.as_str()]);
        }
        debug!(program = %self.program, ?args, "Running kubectl");

        let output = command.output().await.map_err(|e| CollaboratorError::Cluster {
            operation: operation.to_string(),
            reason: format!("failed to run {}: {e}", self.program),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(operation, %stderr, "kubectl failed");
            return Err(CollaboratorError::Cluster {
                operation: operation.to_string(),
                reason: stderr,
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse a single instance; empty output means not found.
pub(crate) fn parse_instance(stdout: &str) -> Result<Option<Instance>> {
    if stdout.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(stdout)?))
}

pub(crate) fn parse_instance_list(stdout: &str) -> Result<Vec<Instance>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list: InstanceList = serde_json::from_str(stdout)?;
    Ok(list.items)
}

#[async_trait]
impl ClusterClient for KubectlCluster {
    async fn get_instance(
        &self,
        kind: InstanceKind,
        name: &InstanceName,
    ) -> Result<Option<Instance>> {
        let stdout = self
            .kubectl(
                "get",
                &[
                    "get",
                    kind.resource_plural(),
                    name.as_str(),
                    "-o",
                    "json",
                    "--ignore-not-found",
                ],
            )
            .await?;
        parse_instance(&stdout)
    }

    async fn list_instances(&self, kind: InstanceKind) -> Result<Vec<Instance>> {
        let stdout = self
            .kubectl("list", &["get", kind.resource_plural(), "-o", "json"])
            .await?;
        parse_instance_list(&stdout)
    }

    async fn apply_manifest(&self, path: &Path) -> Result<()> {
        let path = path.display().to_string();
        self.kubectl("apply", &["apply", "-f", &path]).await?;
        Ok(())
    }
}
