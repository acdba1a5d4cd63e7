use thiserror::Error;

use crate::{BookingId, ResourceId};

pub use sqlx::Error as SqlxError;

/// Errors that can occur when interacting with the booking store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The precondition of a conditional write did not hold: the booking
    /// already existed, was missing, or was at a different version.
    #[error("Condition failed for booking {booking_id}")]
    ConditionFailed { booking_id: BookingId },

    /// Another booking already holds the resource at this start time.
    #[error("Resource {resource_id} is already booked at {start_time_epoch}")]
    SlotTaken {
        resource_id: ResourceId,
        start_time_epoch: i64,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for booking store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
