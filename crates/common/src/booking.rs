use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BookingId, ResourceId, UserId, Version};

/// A reservation linking a user to a resource at a start time.
///
/// This is the record the store persists. `version` and `created_at` are
/// owned by the store: whatever a caller sets is replaced on `put`, except
/// that `created_at` survives replacements of an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub resource_id: ResourceId,
    pub start_time_epoch: i64,
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a booking that has not been stored yet.
    pub fn new(
        booking_id: BookingId,
        user_id: UserId,
        resource_id: ResourceId,
        start_time_epoch: i64,
    ) -> Self {
        Self {
            booking_id,
            user_id,
            resource_id,
            start_time_epoch,
            version: Version::initial(),
            created_at: Utc::now(),
        }
    }

    /// Returns true if `other` books the same resource at the same instant.
    pub fn occupies_same_slot(&self, other: &Booking) -> bool {
        self.resource_id == other.resource_id && self.start_time_epoch == other.start_time_epoch
    }
}
