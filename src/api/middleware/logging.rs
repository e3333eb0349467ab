use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, Level};

use super::RequestId;

/// Wraps the rest of the stack in an `http_request` span and logs one line
/// when the request arrives and one when it completes. 5xx completions are
/// logged at `WARN`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or("-", |id| id.0.as_str())
        .to_owned();
    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        %request_id,
    );

    let handled = async move {
        tracing::info!("started");
        let started = Instant::now();
        let response = next.run(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = response.status();
        if status.is_server_error() {
            tracing::event!(Level::WARN, status = status.as_u16(), elapsed_ms, "finished");
        } else {
            tracing::event!(Level::INFO, status = status.as_u16(), elapsed_ms, "finished");
        }
        response
    };
    handled.instrument(span).await
}
