//! Diagnostic endpoints.

use axum::{Router, http::StatusCode, routing::get};

/// Path of the deliberate-failure endpoint.
pub const ERROR_PATH: &str = "/error";

pub fn diagnostic_routes() -> Router {
    Router::new().route(ERROR_PATH, get(raise_error))
}

/// Always panics; the panic layer answers 500 `INTERNAL_ERROR`.
async fn raise_error() -> StatusCode {
    panic!("deliberate failure requested via {}", ERROR_PATH)
}
