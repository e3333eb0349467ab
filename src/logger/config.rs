//! `[logger]` section: level filter, console output and rotating file output.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use super::error::LoggerError;

const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`; `RUST_LOG` wins when set
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        parse_level(&self.level)?;
        if !(self.console.enabled || self.file.enabled) {
            return Err(LoggerError::option(
                "console.enabled",
                "console and file output are both disabled",
            ));
        }
        if self.file.enabled {
            self.file.validate()?;
        }
        Ok(())
    }
}

/// Case-insensitive level name to [`Level`].
pub fn parse_level(level: &str) -> Result<Level, LoggerError> {
    [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR]
        .into_iter()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(level.trim()))
        .ok_or_else(|| {
            LoggerError::option(
                "level",
                format!("'{level}' is not one of trace, debug, info, warn, error"),
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colours, only honoured when stdout is a terminal
    pub colored: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Keep existing content on startup instead of truncating
    pub append: bool,
    pub format: LogFormat,
    pub rotation: RotationConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/app.log"),
            append: true,
            format: LogFormat::Json,
            rotation: RotationConfig::default(),
        }
    }
}

impl FileConfig {
    fn validate(&self) -> Result<(), LoggerError> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::option(
                "file.path",
                "a path is needed when file output is enabled",
            ));
        }
        self.rotation.validate()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    #[default]
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Full, LogFormat::Compact, LogFormat::Json]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                LoggerError::option("file.format", format!("'{s}' is not full, compact or json"))
            })
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `app.log` rolls over to `app.log.1` once it holds `max_size` bytes;
/// at most `max_files` rolled files are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub max_size: u64,
    pub max_files: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl RotationConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.max_size == 0 {
            return Err(LoggerError::option("file.rotation.max_size", "must be at least 1 byte"));
        }
        if self.max_files == 0 {
            return Err(LoggerError::option("file.rotation.max_files", "must keep at least 1 file"));
        }
        Ok(())
    }
}
