use thiserror::Error;
use tracing_subscriber::util::TryInitError;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected logger option; `option` is its name inside `[logger]`.
    #[error("bad logger option `{option}`: {reason}")]
    Option { option: &'static str, reason: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

impl LoggerError {
    pub(crate) fn option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::Option {
            option,
            reason: reason.into(),
        }
    }
}
