//! Per-request logging around every handler

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log each request before the handler runs and its outcome afterwards.
/// Server errors are logged at `error` level.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    tracing::debug!(%method, %path, "Request started");

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request finished");
    }

    response
}
