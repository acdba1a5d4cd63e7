//! Booking commands.

use chrono::DateTime;
use common::{BookingId, ResourceId, UserId};

use super::ValidationError;

/// Command to create or replace a booking.
///
/// Without a booking ID a new booking is created; with one, the existing
/// booking is replaced by the supplied fields. Resource and start time are
/// optional here so that missing input is reported by validation rather
/// than rejected while parsing a request.
#[derive(Debug, Clone)]
pub struct UpsertBooking {
    /// The booking to replace, or None to create one.
    pub booking_id: Option<BookingId>,

    /// The user owning the booking.
    pub user_id: UserId,

    /// The resource to book.
    pub resource_id: Option<ResourceId>,

    /// Start time in seconds since the epoch.
    pub start_time_epoch: Option<i64>,
}

impl UpsertBooking {
    /// Creates a new UpsertBooking command.
    ///
    /// A blank booking ID is treated as absent.
    pub fn new(
        booking_id: Option<BookingId>,
        user_id: impl Into<UserId>,
        resource_id: Option<ResourceId>,
        start_time_epoch: Option<i64>,
    ) -> Self {
        Self {
            booking_id: booking_id.filter(|id| !id.is_blank()),
            user_id: user_id.into(),
            resource_id,
            start_time_epoch,
        }
    }

    /// Creates a command for a new booking.
    pub fn create(
        user_id: impl Into<UserId>,
        resource_id: impl Into<ResourceId>,
        start_time_epoch: i64,
    ) -> Self {
        Self::new(
            None,
            user_id,
            Some(resource_id.into()),
            Some(start_time_epoch),
        )
    }

    /// Creates a command replacing an existing booking.
    pub fn update(
        booking_id: impl Into<BookingId>,
        user_id: impl Into<UserId>,
        resource_id: impl Into<ResourceId>,
        start_time_epoch: i64,
    ) -> Self {
        Self::new(
            Some(booking_id.into()),
            user_id,
            Some(resource_id.into()),
            Some(start_time_epoch),
        )
    }

    /// Checks that every field is present and well-formed.
    pub(crate) fn validate(&self) -> Result<BookingFields, ValidationError> {
        if self.user_id.is_blank() {
            return Err(ValidationError::EmptyField("userID"));
        }

        let resource_id = self
            .resource_id
            .clone()
            .ok_or(ValidationError::MissingField("resourceID"))?;
        if resource_id.is_blank() {
            return Err(ValidationError::EmptyField("resourceID"));
        }

        let start_time_epoch = self
            .start_time_epoch
            .ok_or(ValidationError::MissingField("starttimeepochtime"))?;
        if start_time_epoch < 0 {
            return Err(ValidationError::NegativeStartTime(start_time_epoch));
        }
        if DateTime::from_timestamp(start_time_epoch, 0).is_none() {
            return Err(ValidationError::InvalidStartTime(start_time_epoch));
        }

        Ok(BookingFields {
            user_id: self.user_id.clone(),
            resource_id,
            start_time_epoch,
        })
    }
}

/// Booking fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookingFields {
    pub user_id: UserId,
    pub resource_id: ResourceId,
    pub start_time_epoch: i64,
}
