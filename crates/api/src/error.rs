//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use thiserror::Error;

/// Body returned for every error other than a missing booking.
pub const GENERIC_ERROR_BODY: &str = "Something broke!";

/// API-level error type that maps to HTTP responses.
///
/// Only a missing booking gets a distinct status (404 with the error
/// message). Conflicts, validation failures, malformed bodies and store
/// failures all collapse to a 500 with a generic body so that internal
/// detail does not leak to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request body could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Returns the status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = status.as_u16(), "request failed");

        if status == StatusCode::NOT_FOUND {
            (status, self.to_string()).into_response()
        } else {
            (status, GENERIC_ERROR_BODY).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{BookingId, ConflictError, ValidationError};

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(DomainError::NotFound {
            booking_id: BookingId::new("b1"),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Booking b1 not found");
    }

    #[test]
    fn conflict_maps_to_500() {
        let err = ApiError::from(DomainError::Conflict(ConflictError::ConcurrentWrite {
            booking_id: BookingId::new("b1"),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_500() {
        let err = ApiError::from(DomainError::Validation(ValidationError::MissingField(
            "resourceID",
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_maps_to_500() {
        let err = ApiError::BadRequest("not json".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
