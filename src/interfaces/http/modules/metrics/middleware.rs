//! HTTP request metrics middleware

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

/// Health and scrape endpoints, not recorded.
const UNTRACKED_PATHS: [&str; 2] = ["/metrics", "/health"];

/// Records, per matched route:
///
/// - **`http_requests_total`**: counter with labels `method`, `path`, `status`
/// - **`http_request_duration_seconds`**: histogram with labels `method`, `path`
///
/// The route template (`/api/parking-spots/{id}/occupy`) is used as `path`
/// instead of the concrete URI. Install with `Router::route_layer`.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => "unmatched".to_string(),
    };
    if UNTRACKED_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }
    let method = request.method().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(duration);

    response
}
