//! Domain error types.

use booking_store::StoreError;
use common::BookingId;
use thiserror::Error;

use crate::booking::{ConflictError, ValidationError};

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No booking exists for the requested ID.
    #[error("Booking {booking_id} not found")]
    NotFound { booking_id: BookingId },

    /// The write would duplicate a booking or lost a concurrent race.
    #[error("Booking conflict: {0}")]
    Conflict(ConflictError),

    /// The booking input was missing or malformed.
    #[error("Invalid booking: {0}")]
    Validation(#[from] ValidationError),

    /// The underlying store failed.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    /// Returns true if this error signals a missing booking.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Returns true if this error signals a conflict the caller may retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }
}

impl From<ConflictError> for DomainError {
    fn from(e: ConflictError) -> Self {
        DomainError::Conflict(e)
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConditionFailed { booking_id } => {
                DomainError::Conflict(ConflictError::ConcurrentWrite { booking_id })
            }
            StoreError::SlotTaken {
                resource_id,
                start_time_epoch,
            } => DomainError::Conflict(ConflictError::SlotTaken {
                resource_id,
                start_time_epoch,
            }),
            other => DomainError::Store(other),
        }
    }
}
