//! Recording instance executor.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{CollaboratorError, Result};
use crate::port::{ExecutionRequest, InstanceExecutor};

/// Executor that records requests instead of starting anything.
#[derive(Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<ExecutionRequest>>,
    failure: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor that records, then fails every request with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl InstanceExecutor for RecordingExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<()> {
        self.requests.lock().push(request.clone());
        match &self.failure {
            Some(reason) => Err(CollaboratorError::Executor {
                instance: request.root.instance_name.clone(),
                reason: reason.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
