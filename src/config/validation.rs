//! Range and format checks run after all sources are merged.

use crate::config::error::ConfigError;
use crate::config::settings::{DatabaseConfig, RepositoryBackend, ServerConfig, Settings};
use crate::logger::LoggerError;

const POSTGRES_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

fn ensure(holds: bool, key: &str, reason: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if holds {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, reason()))
    }
}

impl Settings {
    /// Reports the first offending key. Database keys are only checked when
    /// the database backend is selected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if self.repository.backend == RepositoryBackend::Database {
            self.database.validate()?;
        }
        self.logger.validate().map_err(|error| match error {
            LoggerError::Option { option, reason } => {
                ConfigError::invalid(format!("logger.{option}"), reason)
            }
            other => ConfigError::invalid("logger", other.to_string()),
        })
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.port != 0, "server.port", || "port 0 cannot be bound".into())?;
        ensure(!self.host.trim().is_empty(), "server.host", || {
            "an address to bind is required".into()
        })
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(!self.url.trim().is_empty(), "database.url", || {
            "a connection URL is required for the database backend".into()
        })?;
        ensure(
            POSTGRES_SCHEMES.iter().any(|scheme| self.url.starts_with(scheme)),
            "database.url",
            || "expected postgres://[user[:password]@]host[:port]/dbname".into(),
        )?;
        ensure(self.max_connections > 0, "database.max_connections", || {
            "the pool needs at least one connection".into()
        })?;
        ensure(
            (1..=self.max_connections).contains(&self.min_connections),
            "database.min_connections",
            || format!("must lie between 1 and max_connections ({})", self.max_connections),
        )?;
        ensure(self.stream_batch_size >= 1, "database.stream_batch_size", || {
            format!("{} rows per batch is not allowed", self.stream_batch_size)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/catalog".to_string(),
            ..DatabaseConfig::default()
        }
    }

    fn rejected_key(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::Invalid { key, .. }) => key,
            other => panic!("expected an invalid key, got {:?}", other),
        }
    }

    #[test]
    fn server_port_zero_and_blank_host() {
        assert!(ServerConfig::default().validate().is_ok());

        let zero = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert_eq!(rejected_key(zero.validate()), "server.port");

        let blank = ServerConfig {
            host: " ".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(rejected_key(blank.validate()), "server.host");
    }

    #[test]
    fn database_url_must_be_postgres() {
        assert!(postgres().validate().is_ok());
        assert_eq!(rejected_key(DatabaseConfig::default().validate()), "database.url");

        let mysql = DatabaseConfig {
            url: "mysql://localhost/db".to_string(),
            ..postgres()
        };
        assert_eq!(rejected_key(mysql.validate()), "database.url");
    }

    #[test]
    fn pool_bounds() {
        let inverted = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..postgres()
        };
        assert_eq!(rejected_key(inverted.validate()), "database.min_connections");

        let no_min = DatabaseConfig {
            min_connections: 0,
            ..postgres()
        };
        assert_eq!(rejected_key(no_min.validate()), "database.min_connections");

        let no_max = DatabaseConfig {
            max_connections: 0,
            ..postgres()
        };
        assert_eq!(rejected_key(no_max.validate()), "database.max_connections");

        let no_batch = DatabaseConfig {
            stream_batch_size: 0,
            ..postgres()
        };
        assert_eq!(rejected_key(no_batch.validate()), "database.stream_batch_size");
    }

    #[test]
    fn logger_errors_are_reported_under_logger_prefix() {
        let mut settings = Settings::default();
        settings.logger.level = "verbose".to_string();
        assert_eq!(rejected_key(settings.validate()), "logger.level");

        let mut settings = Settings::default();
        settings.logger.file.enabled = true;
        settings.logger.file.path = Default::default();
        assert_eq!(rejected_key(settings.validate()), "logger.file.path");
    }

    #[test]
    fn database_checked_only_for_database_backend() {
        let mut settings = Settings::default();
        assert!(settings.database.url.is_empty());
        assert!(settings.validate().is_ok());

        settings.repository.backend = RepositoryBackend::Database;
        assert_eq!(rejected_key(settings.validate()), "database.url");

        settings.database = postgres();
        assert!(settings.validate().is_ok());
    }
}
