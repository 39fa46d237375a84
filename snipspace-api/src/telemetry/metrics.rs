//! Prometheus Metrics Definitions
//!
//! Defines all Snipspace metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Store operation latency buckets (seconds)
const STORE_LATENCY_BUCKETS: &[f64] =
    &[0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<SnipspaceMetrics>> = Lazy::new(SnipspaceMetrics::new);

/// Container for all Snipspace metrics.
#[derive(Clone)]
pub struct SnipspaceMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Store operation counter - labels: operation, entity, status
    pub store_operations_total: CounterVec,

    /// Store operation duration histogram - labels: operation, entity
    pub store_operation_duration_seconds: HistogramVec,

    /// Records moved out of the orphaned state
    pub orphans_migrated_total: Counter,
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl SnipspaceMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "snipspace_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "snipspace_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            store_operations_total: register_counter_vec!(
                "snipspace_store_operations_total",
                "Total number of content store operations",
                &["operation", "entity", "status"]
            )
            .map_err(|e| registration_error("store_operations_total", e))?,

            store_operation_duration_seconds: register_histogram_vec!(
                "snipspace_store_operation_duration_seconds",
                "Content store operation duration in seconds",
                &["operation", "entity"],
                STORE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("store_operation_duration_seconds", e))?,

            orphans_migrated_total: register_counter!(
                "snipspace_orphans_migrated_total",
                "Total number of orphaned records assigned to a space"
            )
            .map_err(|e| registration_error("orphans_migrated_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a store operation.
    pub fn record_store_operation(
        &self,
        operation: &str,
        entity: &str,
        success: bool,
        duration_secs: f64,
    ) {
        let status = if success { "success" } else { "error" };
        self.store_operations_total
            .with_label_values(&[operation, entity, status])
            .inc();
        self.store_operation_duration_seconds
            .with_label_values(&[operation, entity])
            .observe(duration_secs);
    }

    pub fn record_orphans_migrated(&self, count: u64) {
        self.orphans_migrated_total.inc_by(count as f64);
    }
}

/// Record a store operation on the global registry, if it initialized.
pub fn record_store_operation(operation: &str, entity: &str, success: bool, duration_secs: f64) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_store_operation(operation, entity, success, duration_secs);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(
    feature = "openapi",
    utoipa::path(
        get,
        path = "/metrics",
        tag = "Observability",
        responses(
            (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
            (status = 500, description = "Failed to encode metrics"),
        ),
    )
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
