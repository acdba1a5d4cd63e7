use async_trait::async_trait;

use crate::{Booking, BookingId, ResourceId, Result, UserId, Version};

/// Precondition for a booking write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutCondition {
    /// Write unconditionally, inserting or replacing.
    #[default]
    Always,

    /// The booking must not exist yet.
    MustNotExist,

    /// The booking must exist at exactly this version.
    ExpectVersion(Version),
}

impl PutCondition {
    /// Creates a condition expecting the booking to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self::ExpectVersion(version)
    }
}

/// Durable storage for booking records.
///
/// Implementations must be thread-safe and must evaluate a write's
/// condition and the resource slot guard atomically with the write
/// itself, so that concurrent writers sharing one store (possibly from
/// several processes) cannot both succeed.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Retrieves a booking by ID.
    ///
    /// Returns None if no booking exists.
    async fn get(&self, booking_id: &BookingId) -> Result<Option<Booking>>;

    /// Stores a booking, subject to `condition`.
    ///
    /// Fails with `ConditionFailed` if the condition does not hold and
    /// with `SlotTaken` if a different booking already holds the same
    /// resource at the same start time.
    ///
    /// Returns the stored booking with its new version. On replacement the
    /// original `created_at` is kept.
    async fn put(&self, booking: Booking, condition: PutCondition) -> Result<Booking>;

    /// Deletes a booking.
    ///
    /// Returns true if a booking was removed, false if none existed.
    async fn delete(&self, booking_id: &BookingId) -> Result<bool>;

    /// Retrieves all bookings owned by a user, oldest first.
    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<Booking>>;

    /// Retrieves all bookings for a resource, oldest first.
    async fn query_by_resource(&self, resource_id: &ResourceId) -> Result<Vec<Booking>>;
}
