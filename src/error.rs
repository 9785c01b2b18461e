use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::InstanceName;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures reported by the cluster client or the instance executor.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("cluster operation '{operation}' failed: {reason}")]
    Cluster { operation: String, reason: String },

    #[error("failed to execute instance {instance}: {reason}")]
    Executor {
        instance: InstanceName,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("metadata of image {image} is unavailable: {reason}")]
    ImageMetadataUnavailable { image: String, reason: String },

    #[error("instance {instance} not found")]
    TargetNotFound { instance: InstanceName },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("resolver task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}
