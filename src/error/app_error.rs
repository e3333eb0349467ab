use crate::config::error::ConfigError;
use crate::error::DatabaseErrorConverter;
use diesel_async::pooled_connection::PoolError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by repositories, handlers and commands.
///
/// Client-facing variants map onto an `ErrorResponse`; the `source` of the
/// server-side ones is only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("no {entity} with {field} {value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Unique or primary key collision
    #[error("{entity} with {field} {value} already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Every failed check of a request body, sorted by field
    #[error("{} field(s) failed validation", errors.len())]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    /// Malformed request that never reached validation
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{operation} failed")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("bad configuration at {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no database connection available")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    #[error("unexpected failure")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    pub fn not_found_by_id(entity: &str, id: i32) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self::Internal { source }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "query")
    }
}

impl From<bb8::RunError<PoolError>> for AppError {
    fn from(error: bb8::RunError<PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::msg(error.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = error.key().unwrap_or("settings").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| ValidationFieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", error.code)),
                })
            })
            .collect();
        // field_errors() is backed by a HashMap
        collected.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors: collected }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 0))]
        count: i32,
    }

    #[test]
    fn not_found_by_id_names_entity_and_id() {
        let error = AppError::not_found_by_id("product", 42);
        assert_eq!(error.to_string(), "no product with id 42");
    }

    #[test]
    fn validator_errors_are_flattened_and_sorted() {
        let sample = Sample {
            name: String::new(),
            count: -1,
        };
        let error = AppError::from(sample.validate().unwrap_err());
        match error {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "count");
                assert!(errors[0].message.contains("range"));
                assert_eq!(errors[1].field, "name");
                assert_eq!(errors[1].message, "Name is required");
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn config_error_keeps_offending_key() {
        let error = AppError::from(ConfigError::invalid("server.port", "bad"));
        match error {
            AppError::Configuration { key, .. } => assert_eq!(key, "server.port"),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn anyhow_errors_become_internal() {
        let error = AppError::from(anyhow::anyhow!("boom"));
        assert!(matches!(error, AppError::Internal { .. }));
    }
}
