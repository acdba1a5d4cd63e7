use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Booking, BookingId, ResourceId, Result, StoreError, UserId, Version,
    store::{BookingStore, PutCondition},
};

/// In-memory booking store.
///
/// Provides the same interface and conditional-write semantics as the
/// PostgreSQL implementation. Every write is checked and applied under a
/// single write lock.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory booking store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bookings stored.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Removes all bookings.
    pub async fn clear(&self) {
        self.bookings.write().await.clear();
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let store = self.bookings.read().await;
        let mut bookings: Vec<_> = store.values().filter(|b| predicate(b)).cloned().collect();
        bookings.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });
        bookings
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn get(&self, booking_id: &BookingId) -> Result<Option<Booking>> {
        let store = self.bookings.read().await;
        Ok(store.get(booking_id).cloned())
    }

    async fn put(&self, mut booking: Booking, condition: PutCondition) -> Result<Booking> {
        let mut store = self.bookings.write().await;

        let existing = store
            .get(&booking.booking_id)
            .map(|b| (b.version, b.created_at));

        let version = match (condition, existing) {
            (PutCondition::Always, None) => Version::first(),
            (PutCondition::Always, Some((current, _))) => current.next(),
            (PutCondition::MustNotExist, None) => Version::first(),
            (PutCondition::ExpectVersion(expected), Some((current, _))) if expected == current => {
                current.next()
            }
            _ => {
                return Err(StoreError::ConditionFailed {
                    booking_id: booking.booking_id,
                });
            }
        };

        // Unique (resource, start time) constraint simulation
        if store
            .values()
            .any(|b| b.booking_id != booking.booking_id && b.occupies_same_slot(&booking))
        {
            return Err(StoreError::SlotTaken {
                resource_id: booking.resource_id,
                start_time_epoch: booking.start_time_epoch,
            });
        }

        booking.version = version;
        if let Some((_, created_at)) = existing {
            booking.created_at = created_at;
        }
        store.insert(booking.booking_id.clone(), booking.clone());

        Ok(booking)
    }

    async fn delete(&self, booking_id: &BookingId) -> Result<bool> {
        let mut store = self.bookings.write().await;
        Ok(store.remove(booking_id).is_some())
    }

    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<Booking>> {
        Ok(self.filtered(|b| &b.user_id == user_id).await)
    }

    async fn query_by_resource(&self, resource_id: &ResourceId) -> Result<Vec<Booking>> {
        Ok(self.filtered(|b| &b.resource_id == resource_id).await)
    }
}
