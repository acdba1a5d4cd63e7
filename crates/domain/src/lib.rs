//! Domain layer for the bookings service.
//!
//! This crate provides the booking domain service, which mediates every
//! mutation of the booking store:
//! - Upsert semantics selected by presence of a booking ID
//! - Field validation
//! - Resource/start-time conflict detection
//! - Typed errors for not-found, conflict, validation and store failures

pub mod booking;
pub mod error;

pub use booking::{BookingService, ConflictError, UpsertBooking, ValidationError};
pub use common::{Booking, BookingId, LocationId, ResourceId, UserId, Version};
pub use error::DomainError;
