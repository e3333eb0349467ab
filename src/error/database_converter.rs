use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Maps diesel failures onto [`AppError`].
///
/// Constraint violations become client errors (duplicate id, unknown related
/// id); everything else is a `Database` error whose details stay in the logs.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// `operation` names what was attempted, e.g. `insert product`.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "row".to_string(),
                field: "query".to_string(),
                value: operation.to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: other.into(),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let text = match info.details() {
            Some(details) => format!("{}\n{}", info.message(), details),
            None => info.message().to_string(),
        };
        let parsed = ConstraintParser::parse(&text, info.table_name(), info.constraint_name());

        match (kind, parsed) {
            (DatabaseErrorKind::UniqueViolation, Some(violation)) => AppError::Duplicate {
                entity: violation.entity,
                field: violation.field,
                value: violation.value.unwrap_or_default(),
            },
            (DatabaseErrorKind::ForeignKeyViolation, Some(violation)) => AppError::Validation {
                field: violation.field,
                reason: match violation.value {
                    Some(value) => format!("Referenced id '{}' does not exist", value),
                    None => "Referenced id does not exist".to_string(),
                },
            },
            (DatabaseErrorKind::NotNullViolation, Some(violation)) => AppError::Validation {
                field: violation.field,
                reason: format!("Field is required for {}", violation.entity),
            },
            (kind, _) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{:?}: {}", kind, text)),
            },
        }
    }
}
