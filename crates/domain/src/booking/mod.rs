//! Booking commands, validation rules, and the booking service.

mod commands;
mod service;

pub use commands::UpsertBooking;
pub use service::BookingService;

use common::{BookingId, ResourceId, UserId};
use thiserror::Error;

/// Errors raised when booking input is missing or malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A required field was supplied but blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The start time lies before the epoch.
    #[error("Invalid start time: {0} (must not be negative)")]
    NegativeStartTime(i64),

    /// The start time cannot be represented as a timestamp.
    #[error("Invalid start time: {0} (not a valid timestamp)")]
    InvalidStartTime(i64),

    /// An update tried to hand the booking to another user.
    #[error("Booking {booking_id} belongs to {owner} and cannot be reassigned to {requested}")]
    OwnerChange {
        booking_id: BookingId,
        owner: UserId,
        requested: UserId,
    },
}

/// Errors raised when a write would violate uniqueness or lost a race.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// Another booking holds the resource at the requested start time.
    #[error("Resource {resource_id} is already booked at {start_time_epoch}")]
    SlotTaken {
        resource_id: ResourceId,
        start_time_epoch: i64,
    },

    /// The booking was created or changed by a concurrent writer.
    #[error("Booking {booking_id} was modified concurrently")]
    ConcurrentWrite { booking_id: BookingId },
}
