//! Prometheus metrics
//!
//! Counters and histograms go through the `metrics` facade; the exporter
//! handle is kept globally so `/metrics` can render it.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once; later calls return the same handle
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PROMETHEUS.get_or_try_init(|| PrometheusBuilder::new().install_recorder()) {
        Ok(handle) => Some(handle.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        },
    }
}

/// Count one HTTP request by route and status
pub fn record_request(endpoint: &str, status: u16) {
    metrics::counter!(
        "upop_http_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Count one failure by error kind
pub fn record_error(kind: &'static str) {
    metrics::counter!("upop_errors_total", "kind" => kind).increment(1);
}

/// Language model round trip, labelled by operation (`chat`, `blueprint`)
pub fn record_llm_latency(operation: &'static str, seconds: f64) {
    metrics::histogram!("upop_llm_latency_seconds", "operation" => operation).record(seconds);
}

/// Sound generation round trip including stream reassembly
pub fn record_synthesis_latency(seconds: f64) {
    metrics::histogram!("upop_synthesis_latency_seconds").record(seconds);
}

pub fn record_audio_bytes(bytes: usize) {
    metrics::histogram!("upop_audio_bytes").record(bytes as f64);
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
