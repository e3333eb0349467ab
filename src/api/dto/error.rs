//! JSON body of every non-2xx response.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `NOT_FOUND`
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(self, request_id: &str) -> Self {
        Self {
            request_id: Some(request_id.to_owned()),
            ..self
        }
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::about_record("NOT_FOUND", "was not found", entity, field, value)
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::about_record("DUPLICATE_ENTRY", "already exists", entity, field, value)
    }

    fn about_record(code: &str, outcome: &str, entity: &str, field: &str, value: &str) -> Self {
        let message = format!("{entity} with {field} '{value}' {outcome}");
        Self::new(code, &message)
            .with_details(json!({ "entity": entity, "field": field, "value": value }))
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", &format!("{field} is invalid"))
            .with_details(json!({ "field": field, "reason": reason }))
    }
}
