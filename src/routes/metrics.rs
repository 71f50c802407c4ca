//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "mahlzeit_requests_total",
        "Total number of requests processed"
    );
    metrics::describe_counter!(
        "mahlzeit_auth_rejected_total",
        "Requests rejected by the identity-requirement gate"
    );
    metrics::describe_counter!(
        "mahlzeit_rate_limited_total",
        "Requests rejected by a rate limiter, by scope"
    );
    metrics::describe_histogram!(
        "mahlzeit_request_duration_seconds",
        "Request duration in seconds"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a handled request
pub fn record_request(route: &str, status: &str, duration_secs: f64) {
    metrics::counter!("mahlzeit_requests_total", "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
    metrics::histogram!("mahlzeit_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record a rejection by the identity-requirement gate
pub fn record_auth_rejected() {
    metrics::counter!("mahlzeit_auth_rejected_total").increment(1);
}

/// Record a rate-limit rejection (`scope` is `auth` or `user`)
pub fn record_rate_limited(scope: &str) {
    metrics::counter!("mahlzeit_rate_limited_total", "scope" => scope.to_string()).increment(1);
}
