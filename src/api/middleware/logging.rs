//! Request logging middleware.
//!
//! Logs every API request with method, path, response status and
//! latency. Server errors are logged at `warn`.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

pub async fn log_request(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, path = %path, status, latency_ms, "Request failed");
    } else {
        tracing::info!(%method, path = %path, status, latency_ms, "Request served");
    }

    response
}
