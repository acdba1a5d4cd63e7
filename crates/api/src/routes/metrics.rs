//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Registers descriptions for the booking metrics.
///
/// Call once after installing the recorder.
pub fn describe() {
    metrics::describe_counter!(
        "bookings_processed_total",
        Unit::Count,
        "Booking requests processed"
    );
    metrics::describe_counter!(
        "bookings_errors_total",
        Unit::Count,
        "Booking requests answered with an error status"
    );
    metrics::describe_histogram!(
        "bookings_request_duration_seconds",
        Unit::Seconds,
        "Booking request latency"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
}
