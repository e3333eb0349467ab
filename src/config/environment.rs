use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment stage the process runs in.
///
/// Names the optional `{stage}.toml` layer; only `Development` mounts the
/// Swagger UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub const ENV_VAR: &'static str = "CATALOG_APP_ENV";

    const NAMES: [(Environment, &'static str); 4] = [
        (Environment::Development, "development"),
        (Environment::Test, "test"),
        (Environment::Staging, "staging"),
        (Environment::Production, "production"),
    ];

    /// Value of `CATALOG_APP_ENV`, falling back to development when unset
    /// or unrecognised.
    pub fn from_env() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(raw) => raw.parse().unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find_map(|(env, name)| (*env == self).then_some(*name))
            .unwrap_or("development")
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let canonical = match lowered.as_str() {
            "dev" => "development",
            "stage" => "staging",
            "prod" => "production",
            other => other,
        };
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == canonical)
            .map(|(env, _)| *env)
            .ok_or_else(|| ConfigError::UnknownEnvironment(s.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
