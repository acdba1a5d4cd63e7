//! Request interceptors: business metrics and request spans.

use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tower_http::trace::MakeSpan;
use tracing::Span;

/// Header carrying the request ID. Generated when the caller sends none.
pub const REQUEST_ID_HEADER: &str = "requestid";

/// Layer recording business metrics for every booking request.
///
/// Emits, labelled by HTTP method and matched route template:
/// - `bookings_processed_total` for every request
/// - `bookings_errors_total` for responses with a 4xx/5xx status
/// - `bookings_request_duration_seconds`
///
/// Apply it with `Router::route_layer` so the matched route is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingMetricsLayer;

impl BookingMetricsLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for BookingMetricsLayer {
    type Service = BookingMetrics<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BookingMetrics { inner }
    }
}

/// Service produced by [`BookingMetricsLayer`].
#[derive(Debug, Clone)]
pub struct BookingMetrics<S> {
    inner: S,
}

impl<S> Service<Request> for BookingMetrics<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let method = request.method().to_string();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_owned())
            .unwrap_or_else(|| request.uri().path().to_owned());

        // The clone may not be ready; keep the instance that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let started = Instant::now();
            metrics::counter!("bookings_processed_total", "method" => method.clone(), "route" => route.clone())
                .increment(1);

            let response = inner.call(request).await?;

            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                metrics::counter!("bookings_errors_total", "method" => method.clone(), "route" => route.clone())
                    .increment(1);
            }
            metrics::histogram!("bookings_request_duration_seconds", "method" => method, "route" => route)
                .record(started.elapsed().as_secs_f64());

            Ok(response)
        })
    }
}

/// Builds the per-request tracing span, tagged with the request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingSpan;

impl<B> MakeSpan<B> for BookingSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

