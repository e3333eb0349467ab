use std::path::PathBuf;

use thiserror::Error;

/// Failure while assembling [`Settings`](super::Settings) from its sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration file {}", .0.display())]
    MissingFile(PathBuf),

    #[error("configuration could not be decoded: {0}")]
    Malformed(String),

    /// `key` is the dotted path of the rejected setting, e.g. `server.port`.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },

    #[error("unknown environment name '{0}' (expected development, test, staging or production)")]
    UnknownEnvironment(String),

    #[error("conflicting configuration sources: {0}")]
    ConflictingSources(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Dotted key of the offending setting, when the error concerns one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Invalid { key, .. } => Some(key),
            _ => None,
        }
    }
}
