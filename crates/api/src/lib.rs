//! HTTP API server with observability for the bookings service.
//!
//! Provides REST endpoints for creating, reading, listing and deleting
//! bookings, with request-id tracing, business metrics, and a Prometheus
//! scrape endpoint.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use axum::routing::get;
use booking_store::BookingStore;
use domain::BookingService;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use middleware::{BookingMetricsLayer, BookingSpan, REQUEST_ID_HEADER};
use routes::bookings::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// Business metrics are recorded for booking routes only; `/health` and
/// `/metrics` are left out.
pub fn create_app<S: BookingStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let bookings_router = Router::new()
        .route(
            "/locations/{location_id}/resources/{resource_id}/bookings",
            get(routes::bookings::list_by_resource::<S>),
        )
        .route(
            "/users/{user_id}/bookings",
            get(routes::bookings::list_by_user::<S>).put(routes::bookings::create::<S>),
        )
        .route(
            "/users/{user_id}/bookings/{booking_id}",
            get(routes::bookings::get::<S>)
                .put(routes::bookings::upsert::<S>)
                .delete(routes::bookings::delete::<S>),
        )
        .route_layer(BookingMetricsLayer::new())
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(bookings_router)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http().make_span_with(BookingSpan))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

/// Creates the application state around a booking store.
pub fn create_default_state<S: BookingStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        booking_service: BookingService::new(store),
    })
}
