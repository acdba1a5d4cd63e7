//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::routes::bookings::{AppState, BookingResponse};
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use booking_store::InMemoryBookingStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");
            api::routes::metrics::describe();
            handle
        })
        .clone()
}

fn setup() -> axum::Router {
    let (app, _) = setup_with_state();
    app
}

fn setup_with_state() -> (axum::Router, Arc<AppState<InMemoryBookingStore>>) {
    let state = api::create_default_state(InMemoryBookingStore::new());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn put_booking(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_booking(
    app: &axum::Router,
    user: &str,
    resource: &str,
    start: i64,
) -> BookingResponse {
    let response = send(
        app,
        put_booking(
            &format!("/users/{user}/bookings"),
            serde_json::json!({ "resourceID": resource, "starttimeepochtime": start }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Ok");
}

#[tokio::test]
async fn test_create_booking() {
    let app = setup();

    let response = send(
        &app,
        put_booking(
            "/users/u1/bookings",
            serde_json::json!({ "resourceID": "r1", "starttimeepochtime": 1000 }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json: serde_json::Value = body_json(response).await;
    assert!(!json["bookingID"].as_str().unwrap().is_empty());
    assert_eq!(json["userID"], "u1");
    assert_eq!(json["resourceID"], "r1");
    assert_eq!(json["startTimeEpoch"], 1000);
}

#[tokio::test]
async fn test_create_and_get_booking() {
    let app = setup();
    let created = create_booking(&app, "u1", "r1", 1000).await;

    let response = send(
        &app,
        get(&format!("/users/u1/bookings/{}", created.booking_id)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let fetched: BookingResponse = body_json(response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_nonexistent_booking() {
    let app = setup();

    let response = send(&app, get("/users/u1/bookings/does-not-exist")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_string(response).await,
        "Booking does-not-exist not found"
    );
}

#[tokio::test]
async fn test_update_booking() {
    let app = setup();
    let created = create_booking(&app, "u1", "r1", 1000).await;

    let response = send(
        &app,
        put_booking(
            &format!("/users/u1/bookings/{}", created.booking_id),
            serde_json::json!({ "resourceID": "r1", "starttimeepochtime": 2000 }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let updated: BookingResponse = body_json(response).await;
    assert_eq!(updated.booking_id, created.booking_id);
    assert_eq!(updated.start_time_epoch, 2000);

    let response = send(&app, get("/locations/l1/resources/r1/bookings")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bookings: Vec<BookingResponse> = body_json(response).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].start_time_epoch, 2000);
}

#[tokio::test]
async fn test_update_unknown_booking_is_404() {
    let app = setup();

    let response = send(
        &app,
        put_booking(
            "/users/u1/bookings/unknown",
            serde_json::json!({ "resourceID": "r1", "starttimeepochtime": 1000 }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conflicting_booking_is_500() {
    let app = setup();
    create_booking(&app, "u1", "r1", 1000).await;

    let response = send(
        &app,
        put_booking(
            "/users/u2/bookings",
            serde_json::json!({ "resourceID": "r1", "starttimeepochtime": 1000 }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, api::error::GENERIC_ERROR_BODY);
}

#[tokio::test]
async fn test_missing_fields_are_500() {
    let (app, state) = setup_with_state();

    let response = send(
        &app,
        put_booking(
            "/users/u1/bookings",
            serde_json::json!({ "resourceID": "r1" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.booking_service.store().booking_count().await, 0);
}

#[tokio::test]
async fn test_malformed_body_is_500() {
    let app = setup();

    let request = Request::builder()
        .method("PUT")
        .uri("/users/u1/bookings")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, api::error::GENERIC_ERROR_BODY);
}

#[tokio::test]
async fn test_non_numeric_start_time_is_500() {
    let app = setup();

    let response = send(
        &app,
        put_booking(
            "/users/u1/bookings",
            serde_json::json!({ "resourceID": "r1", "starttimeepochtime": "soon" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_bookings_by_user() {
    let app = setup();
    create_booking(&app, "u1", "r1", 1000).await;
    create_booking(&app, "u1", "r2", 1000).await;
    create_booking(&app, "u2", "r1", 2000).await;

    let response = send(&app, get("/users/u1/bookings")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bookings: Vec<BookingResponse> = body_json(response).await;
    assert_eq!(bookings.len(), 2);
    assert!(bookings.iter().all(|b| b.user_id == "u1"));
}

#[tokio::test]
async fn test_empty_listings() {
    let app = setup();

    let response = send(&app, get("/users/nobody/bookings")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bookings: Vec<BookingResponse> = body_json(response).await;
    assert!(bookings.is_empty());

    let response = send(&app, get("/locations/l1/resources/empty/bookings")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bookings: Vec<BookingResponse> = body_json(response).await;
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn test_delete_booking() {
    let app = setup();
    let created = create_booking(&app, "u1", "r1", 1000).await;
    let uri = format!("/users/u1/bookings/{}", created.booking_id);

    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());

    let response = send(&app, get(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_booking_is_404() {
    let app = setup();

    let response = send(&app, delete("/users/u1/bookings/never-created")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = setup();

    let response = send(&app, get("/users/u1/bookings")).await;
    let generated = response
        .headers()
        .get(api::middleware::REQUEST_ID_HEADER)
        .expect("request id header");
    assert!(!generated.is_empty());

    let request = Request::builder()
        .uri("/users/u1/bookings")
        .header("requestId", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(
        response
            .headers()
            .get(api::middleware::REQUEST_ID_HEADER)
            .unwrap(),
        "req-42"
    );
}

#[tokio::test]
async fn test_metrics_endpoint_reports_booking_requests() {
    let app = setup();
    create_booking(&app, "metrics-user", "metrics-room", 1000).await;
    send(&app, get("/users/metrics-user/bookings/missing")).await;

    let response = send(&app, get("/metrics")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("bookings_processed_total"));
    assert!(body.contains("bookings_errors_total"));
    assert!(body.contains(r#"route="/users/{user_id}/bookings/{booking_id}""#));
}
