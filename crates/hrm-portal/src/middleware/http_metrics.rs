//! HTTP metrics middleware.
//!
//! Applied as the outermost layer so that every response is counted,
//! including framework rejections (400 on JSON parse errors, 404, 405, 415),
//! timeouts from the timeout layer, and route filter redirects.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status, and duration of every request.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}
