//! Correlation ids: the caller's `x-request-id` when present, a UUID v4
//! otherwise. The id is exposed to later layers as a request extension and
//! echoed back on the response.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn resolve(incoming: Option<&HeaderValue>) -> Self {
        match incoming.and_then(|raw| raw.to_str().ok()).map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_owned()),
            _ => Self(Uuid::new_v4().to_string()),
        }
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = RequestId::resolve(request.headers().get(REQUEST_ID_HEADER));
    let echoed = HeaderValue::from_str(&id.0).ok();
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;
    if let Some(value) = echoed {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
