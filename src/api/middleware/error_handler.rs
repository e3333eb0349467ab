//! Error handler for converting AppError to HTTP responses.
//!
//! Implements `IntoResponse` for `AppError`, turns extractor rejections into
//! `AppError`, and normalizes framework error responses (unknown route,
//! wrong method, panics) into the same `ErrorResponse` envelope.

use std::any::Any;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// Server-side failures are logged with their source chain; the client
    /// only sees a sanitized message.
    fn into_response(self) -> Response {
        match &self {
            AppError::Database { source, .. }
            | AppError::Configuration { source, .. }
            | AppError::ConnectionPool { source }
            | AppError::Internal { source } => {
                tracing::error!(error = %self, source = ?source, "Request failed");
            }
            _ => tracing::debug!(error = %self, "Request rejected"),
        }

        (error_to_status_code(&self), Json(error_to_response(&self))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing or invalid Content-Type header, expected application/json".to_string()
            }
            other => format!("Failed to read JSON request: {}", other.body_text()),
        };
        AppError::BadRequest { message }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest {
            message: format!("Invalid path parameters: {}", rejection.body_text()),
        }
    }
}

/// Builds the client-facing body for an error.
pub fn error_to_response(error: &AppError) -> ErrorResponse {
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => ErrorResponse::not_found_error(entity, field, value),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => ErrorResponse::duplicate_error(entity, field, value),
        AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
        AppError::ValidationErrors { errors } => {
            ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                .with_details(json!({ "errors": errors }))
        }
        AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
        AppError::Database { operation, .. } => ErrorResponse::new(
            "DATABASE_ERROR",
            &format!("Database operation failed: {}", operation),
        )
        .with_details(json!({ "operation": operation })),
        AppError::Configuration { key, .. } => {
            ErrorResponse::new("CONFIGURATION_ERROR", &format!("Configuration error: {}", key))
                .with_details(json!({ "key": key }))
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable")
        }
        AppError::Internal { .. } => ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Global error handling middleware.
///
/// Error responses that are not JSON yet (unknown route, wrong method,
/// unsupported media type) are rewritten into an `ErrorResponse`. JSON error
/// bodies produced by this crate get the request id attached.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_else(|_| Bytes::new());

    if is_json {
        return match attach_request_id(&body_bytes, request_id.as_deref()) {
            Some(value) => (parts.status, Json(value)).into_response(),
            None => Response::from_parts(parts, body_bytes.into()),
        };
    }

    let original_message = String::from_utf8_lossy(&body_bytes).trim().to_string();
    let mut error_response = status_to_response(status, original_message);
    if let Some(id) = request_id {
        error_response = error_response.with_request_id(&id);
    }

    (status, Json(error_response)).into_response()
}

/// Response for a panic caught by `CatchPanicLayer`.
///
/// The panic payload is logged and never sent to the client.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")),
    )
        .into_response()
}

fn attach_request_id(body: &[u8], request_id: Option<&str>) -> Option<Value> {
    let request_id = request_id?;
    let mut value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object_mut()?;
    if !object.contains_key("code") || object.contains_key("requestId") {
        return None;
    }
    object.insert("requestId".to_string(), Value::String(request_id.to_string()));
    Some(value)
}

fn status_to_response(status: StatusCode, original_message: String) -> ErrorResponse {
    let (code, fallback) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => (
            "METHOD_NOT_ALLOWED",
            "HTTP method not allowed for this endpoint",
        ),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::UNPROCESSABLE_ENTITY => ("BAD_REQUEST", "Request body could not be processed"),
        StatusCode::SERVICE_UNAVAILABLE => ("SERVICE_UNAVAILABLE", "Service temporarily unavailable"),
        // Server error bodies may leak internals
        s if s.is_server_error() => {
            return ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred");
        }
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    if original_message.is_empty() {
        ErrorResponse::new(code, fallback)
    } else {
        ErrorResponse::new(code, &original_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFieldError;

    fn not_found() -> AppError {
        AppError::not_found_by_id("product", 123)
    }

    #[test]
    fn test_not_found_status_code() {
        let error = not_found();
        assert_eq!(error_to_status_code(&error), StatusCode::NOT_FOUND);
        assert_eq!(error_to_code(&error), "NOT_FOUND");
    }

    #[test]
    fn test_duplicate_status_code() {
        let error = AppError::Duplicate {
            entity: "category".to_string(),
            field: "id".to_string(),
            value: "1".to_string(),
        };
        assert_eq!(error_to_status_code(&error), StatusCode::CONFLICT);
        assert_eq!(error_to_code(&error), "DUPLICATE_ENTRY");
    }

    #[test]
    fn test_validation_errors_status_code() {
        let error = AppError::ValidationErrors {
            errors: vec![ValidationFieldError {
                field: "title".to_string(),
                message: "Title is required".to_string(),
            }],
        };
        assert_eq!(error_to_status_code(&error), StatusCode::BAD_REQUEST);
        assert_eq!(error_to_code(&error), "VALIDATION_ERROR");

        let body = error_to_response(&error);
        assert_eq!(body.details.unwrap()["errors"][0]["field"], "title");
    }

    #[test]
    fn test_server_errors_are_sanitized() {
        let error = AppError::Internal {
            source: anyhow::anyhow!("secret connection string"),
        };
        assert_eq!(error_to_status_code(&error), StatusCode::INTERNAL_SERVER_ERROR);
        let body = error_to_response(&error);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_connection_pool_is_unavailable() {
        let error = AppError::ConnectionPool {
            source: anyhow::anyhow!("timed out"),
        };
        assert_eq!(error_to_status_code(&error), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error_to_code(&error), "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_code_matches_rendered_body() {
        let errors = [
            not_found(),
            AppError::BadRequest {
                message: "bad".to_string(),
            },
            AppError::Validation {
                field: "id".to_string(),
                reason: "negative".to_string(),
            },
            AppError::Database {
                operation: "add product".to_string(),
                source: anyhow::anyhow!("boom"),
            },
        ];
        for error in &errors {
            assert_eq!(error_to_response(error).code, error_to_code(error));
        }
    }

    #[test]
    fn test_status_to_response_uses_fallback_message() {
        let body = status_to_response(StatusCode::METHOD_NOT_ALLOWED, String::new());
        assert_eq!(body.code, "METHOD_NOT_ALLOWED");
        assert_eq!(body.message, "HTTP method not allowed for this endpoint");

        let body = status_to_response(StatusCode::INTERNAL_SERVER_ERROR, "stack trace".to_string());
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("stack"));
    }

    #[test]
    fn test_handle_panic_hides_payload() {
        let response = handle_panic(Box::new("db password is hunter2".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_attach_request_id_only_to_error_envelopes() {
        let body = br#"{"code":"NOT_FOUND","message":"gone"}"#;
        let value = attach_request_id(body, Some("req-1")).unwrap();
        assert_eq!(value["requestId"], "req-1");

        assert!(attach_request_id(br#"{"title":"x"}"#, Some("req-1")).is_none());
        assert!(attach_request_id(body, None).is_none());
        assert!(attach_request_id(b"not json", Some("req-1")).is_none());
    }
}
