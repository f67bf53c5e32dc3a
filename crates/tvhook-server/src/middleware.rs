//! Request correlation middleware.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info_span, Instrument};
use tvhook_dispatch::RequestContext;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub const RESPONSE_TIME_HEADER: &str = "X-Response-Time-ms";

/// Attach a [`RequestContext`] to the request, run the rest of the stack
/// inside a `request` span, and stamp the correlation headers on the response.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::from_header(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let span = info_span!(
        "request",
        request_id = %ctx.request_id(),
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(ctx.request_id()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    headers.insert(RESPONSE_TIME_HEADER, HeaderValue::from(ctx.elapsed_ms()));
    response
}
