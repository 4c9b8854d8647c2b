use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

const SCRAPE_PATH: &str = "/metrics";

/// Request latency buckets in seconds. Argon2 logins sit in the upper range.
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Records `http_requests_total` and `http_request_duration_seconds`
/// labelled by method, route template and status. Scrapes are not counted.
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Route template, never the raw URI.
    let path = match matched_path {
        Some(p) if p.as_str() == SCRAPE_PATH => return next.run(req).await,
        Some(p) => p.as_str().to_string(),
        None => "unmatched".to_string(),
    };
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());

    response
}

/// Install the global Prometheus recorder. Call once per process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()
}
