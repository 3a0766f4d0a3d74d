use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Request logging middleware
///
/// Client errors log at warn, server errors at error, the rest at info.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(%method, %uri, %route, %status, duration_ms, "Request processed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %uri, %route, %status, duration_ms, "Request processed");
    } else {
        tracing::info!(%method, %uri, %route, %status, duration_ms, "Request processed");
    }

    response
}
