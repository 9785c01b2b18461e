//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the repository location can be
//! overridden with the `CELLMESH_REPOSITORY` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use cellmesh::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("cellmesh.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::service::{
    ClusterConfig, ExecutorConfig, RepositoryConfig, ResolverConfig, RoutingConfig, REPOSITORY_ENV,
};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; missing sections take their defaults. Load
/// from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Local image repository.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Cluster access.
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Runtime process used to start instances.
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Topology resolver limits.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Routing manifest output.
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` when it exists, otherwise use defaults.
    ///
    /// Environment overrides and validation apply either way.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Initialize the tracing subscriber from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    fn apply_env_overrides(&mut self) {
        if let Some(path) = std::env::var_os(REPOSITORY_ENV).filter(|p| !p.is_empty()) {
            self.repository.path = PathBuf::from(path);
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }
        if self.resolver.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.max_concurrency",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cluster.kubectl.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "cluster.kubectl",
            }
            .into());
        }
        if self.executor.program.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "executor.program",
            }
            .into());
        }
        if self.routing.manifest.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "routing.manifest",
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.resolver.max_concurrency, 8);
        assert_eq!(config.executor.program, "cellmesh-runtime");
        assert_eq!(config.routing.manifest, PathBuf::from("routes.yaml"));
        assert!(config.cluster.namespace.is_none());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = Config::parse_toml("[resolver]\nmax_concurrency = 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "resolver.max_concurrency",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = Config::parse_toml("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/cellmesh.toml").unwrap();
        assert_eq!(config.cluster.kubectl, "kubectl");
    }
}
