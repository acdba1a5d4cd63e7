//! Shared types for the bookings service.

mod booking;
mod types;

pub use booking::Booking;
pub use types::{BookingId, LocationId, ResourceId, UserId, Version};
