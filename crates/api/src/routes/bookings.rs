//! Booking endpoints.
//!
//! Each handler parses its path and body, makes exactly one call into the
//! booking service, and maps the result to a response.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use booking_store::BookingStore;
use common::{Booking, BookingId, LocationId, ResourceId, UserId};
use domain::{BookingService, UpsertBooking};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: BookingStore> {
    pub booking_service: BookingService<S>,
}

// -- Path types --

#[derive(Debug, Deserialize)]
pub struct ResourcePath {
    pub location_id: LocationId,
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct UserBookingPath {
    pub user_id: UserId,
    pub booking_id: BookingId,
}

// -- Request types --

/// Body of `PUT /users/{userID}/bookings[/{bookingID}]`.
///
/// Both fields are optional here; absence is reported by domain validation.
#[derive(Debug, Deserialize)]
pub struct UpsertBookingRequest {
    #[serde(rename = "resourceID")]
    pub resource_id: Option<String>,
    pub starttimeepochtime: Option<i64>,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingResponse {
    #[serde(rename = "bookingID")]
    pub booking_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "resourceID")]
    pub resource_id: String,
    #[serde(rename = "startTimeEpoch")]
    pub start_time_epoch: i64,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.booking_id.into_inner(),
            user_id: booking.user_id.into_inner(),
            resource_id: booking.resource_id.into_inner(),
            start_time_epoch: booking.start_time_epoch,
        }
    }
}

fn to_responses(bookings: Vec<Booking>) -> Vec<BookingResponse> {
    bookings.into_iter().map(BookingResponse::from).collect()
}

// -- Handlers --

/// GET /locations/:locationID/resources/:resourceID/bookings: list a resource's bookings.
#[tracing::instrument(skip(state))]
pub async fn list_by_resource<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<ResourcePath>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state
        .booking_service
        .get_bookings_by_resource(&path.resource_id)
        .await?;

    Ok(Json(to_responses(bookings)))
}

/// GET /users/:userID/bookings: list a user's bookings.
#[tracing::instrument(skip(state))]
pub async fn list_by_user<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<UserPath>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state
        .booking_service
        .get_bookings_by_user(&path.user_id)
        .await?;

    Ok(Json(to_responses(bookings)))
}

/// GET /users/:userID/bookings/:bookingID: load a booking by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<UserBookingPath>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .booking_service
        .get_booking(&path.booking_id)
        .await?;

    Ok(Json(booking.into()))
}

/// PUT /users/:userID/bookings: create a booking with a generated ID.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<UserPath>,
    payload: Result<Json<UpsertBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    upsert_booking(&state.booking_service, None, path.user_id, payload).await
}

/// PUT /users/:userID/bookings/:bookingID: replace an existing booking.
#[tracing::instrument(skip(state, payload))]
pub async fn upsert<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<UserBookingPath>,
    payload: Result<Json<UpsertBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    upsert_booking(
        &state.booking_service,
        Some(path.booking_id),
        path.user_id,
        payload,
    )
    .await
}

/// DELETE /users/:userID/bookings/:bookingID: delete a booking.
#[tracing::instrument(skip(state))]
pub async fn delete<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<UserBookingPath>,
) -> Result<StatusCode, ApiError> {
    state
        .booking_service
        .delete_booking(&path.booking_id)
        .await?;

    Ok(StatusCode::OK)
}

async fn upsert_booking<S: BookingStore>(
    service: &BookingService<S>,
    booking_id: Option<BookingId>,
    user_id: UserId,
    payload: Result<Json<UpsertBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(req) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid booking body: {e}")))?;

    let cmd = UpsertBooking::new(
        booking_id,
        user_id,
        req.resource_id.map(ResourceId::new),
        req.starttimeepochtime,
    );
    let booking = service.upsert_booking(cmd).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}
