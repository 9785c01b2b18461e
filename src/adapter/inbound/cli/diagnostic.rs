//! Miette-based error diagnostics for CLI error presentation.
//!
//! Converts [`Error`] into a [`CommandError`] carrying a diagnostic code and,
//! where the fix is predictable, a help line.

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::error::{CollaboratorError, ConfigError, Error};

/// A failed command, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(cellmesh::command))]
pub struct CommandError {
    /// Human-readable error message.
    pub message: String,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl CommandError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        let help = match &err {
            Error::Domain(DomainError::MalformedArgument { expected, .. }) => {
                Some(format!("expected format: {expected}"))
            }
            Error::Domain(DomainError::UnknownAlias { .. }) => {
                Some("link only aliases the image declares as dependencies".to_string())
            }
            Error::Domain(DomainError::DanglingLink { .. }) => Some(
                "a link owner must be an instance started by this run; pass -d to start dependencies"
                    .to_string(),
            ),
            Error::Domain(DomainError::PercentageOutOfRange { .. }) => {
                Some("pass -p with a value between 0 and 100".to_string())
            }
            Error::ImageMetadataUnavailable { .. } => {
                Some("check the repository path in [repository] or CELLMESH_REPOSITORY".to_string())
            }
            Error::TargetNotFound { .. } => Some("check the instance name and the cluster namespace".to_string()),
            Error::Config(ConfigError::Parse(_) | ConfigError::ReadFile(_)) => {
                Some("fix the file passed with --config".to_string())
            }
            Error::Collaborator(CollaboratorError::Cluster { .. }) => {
                Some("check that kubectl can reach the cluster".to_string())
            }
            _ => None,
        };

        let diagnostic = Self::new(err.to_string());
        match help {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_argument_names_expected_format() {
        let err = Error::Domain(DomainError::MalformedArgument {
            argument: "bad".into(),
            expected: "[<instance>:]<key>=<value>",
        });
        let diagnostic = CommandError::from(err);

        assert!(diagnostic.message.contains("bad"));
        assert_eq!(
            diagnostic.help.as_deref(),
            Some("expected format: [<instance>:]<key>=<value>")
        );
    }

    #[test]
    fn other_errors_have_no_help() {
        let diagnostic = CommandError::from(Error::Task("cancelled".into()));
        assert!(diagnostic.help.is_none());
    }
}
