//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Router, http::Uri, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::{self, OPENAPI_JSON_PATH, SWAGGER_UI_PATH};
use crate::api::handlers::{
    CATEGORIES_SEGMENT, PRODUCTS_SEGMENT, diagnostics::diagnostic_routes, entities::map_routes,
};
use crate::api::middleware::{
    global_error_handler, handle_panic, logging_middleware, request_id_middleware,
};
use crate::error::AppError;
use crate::repositories::Repositories;

/// Creates the application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run outermost first:
/// 1. Request ID - generates/propagates `x-request-id`
/// 2. Logging - request span and response timing
/// 3. Global error handler - normalizes error bodies, attaches the request id
/// 4. Panic catcher - turns a handler panic into a 500 `ErrorResponse`
///
/// # Routes
/// - `/Products`, `/Categories` - entity CRUD
/// - `/error` - deliberate failure
/// - `/swagger-ui`, `/api-docs/openapi.json` - only when `with_docs` is set
pub fn create_router(repositories: Repositories, with_docs: bool) -> Router {
    let mut router = Router::new()
        .merge(map_routes(PRODUCTS_SEGMENT, repositories.products))
        .merge(map_routes(CATEGORIES_SEGMENT, repositories.categories))
        .merge(diagnostic_routes());

    if with_docs {
        router = router.merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, doc::openapi()));
    }

    // Middleware is applied in reverse order - last added runs first
    router
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        entity: "route".to_string(),
        field: "path".to_string(),
        value: uri.path().to_string(),
    }
}
