//! Booking service: the single mediator of booking mutations.

use booking_store::{BookingStore, PutCondition};
use common::{Booking, BookingId, ResourceId, UserId};

use crate::error::DomainError;

use super::{ConflictError, UpsertBooking, ValidationError};

/// Service for managing bookings.
///
/// Holds no state besides the store handle and takes no locks of its own:
/// the store's conditional write is the only serialization point, so any
/// number of service instances may share one store.
pub struct BookingService<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> BookingService<S> {
    /// Creates a new booking service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a booking by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_booking(&self, booking_id: &BookingId) -> Result<Booking, DomainError> {
        self.store
            .get(booking_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                booking_id: booking_id.clone(),
            })
    }

    /// Lists the bookings owned by a user. Empty if there are none.
    #[tracing::instrument(skip(self))]
    pub async fn get_bookings_by_user(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError> {
        Ok(self.store.query_by_user(user_id).await?)
    }

    /// Lists the bookings of a resource. Empty if there are none.
    #[tracing::instrument(skip(self))]
    pub async fn get_bookings_by_resource(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Vec<Booking>, DomainError> {
        Ok(self.store.query_by_resource(resource_id).await?)
    }

    /// Creates a booking, or replaces one when the command names a booking ID.
    ///
    /// Fails with `NotFound` when replacing a booking that does not exist,
    /// with `Validation` on bad input, and with `Conflict` when another
    /// booking holds the slot or a concurrent writer got there first.
    #[tracing::instrument(skip(self))]
    pub async fn upsert_booking(&self, cmd: UpsertBooking) -> Result<Booking, DomainError> {
        match cmd.booking_id.clone() {
            None => self.create_booking(&cmd).await,
            Some(booking_id) => self.replace_booking(booking_id, &cmd).await,
        }
    }

    /// Deletes a booking.
    ///
    /// Fails with `NotFound` if it did not exist, including when it was
    /// already deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_booking(&self, booking_id: &BookingId) -> Result<(), DomainError> {
        if self.store.delete(booking_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound {
                booking_id: booking_id.clone(),
            })
        }
    }

    async fn create_booking(&self, cmd: &UpsertBooking) -> Result<Booking, DomainError> {
        let fields = cmd.validate()?;
        let booking = Booking::new(
            BookingId::generate(),
            fields.user_id,
            fields.resource_id,
            fields.start_time_epoch,
        );

        self.ensure_slot_free(&booking).await?;

        Ok(self.store.put(booking, PutCondition::MustNotExist).await?)
    }

    async fn replace_booking(
        &self,
        booking_id: BookingId,
        cmd: &UpsertBooking,
    ) -> Result<Booking, DomainError> {
        let existing = self.get_booking(&booking_id).await?;
        let fields = cmd.validate()?;

        if fields.user_id != existing.user_id {
            return Err(ValidationError::OwnerChange {
                booking_id,
                owner: existing.user_id,
                requested: fields.user_id,
            }
            .into());
        }

        let expected = existing.version;
        let booking = Booking {
            resource_id: fields.resource_id,
            start_time_epoch: fields.start_time_epoch,
            ..existing
        };

        self.ensure_slot_free(&booking).await?;

        Ok(self
            .store
            .put(booking, PutCondition::expect_version(expected))
            .await?)
    }

    /// Fails if a booking other than `booking` holds its resource slot.
    ///
    /// Concurrent writers can both pass this check; the store's slot guard
    /// decides between them.
    async fn ensure_slot_free(&self, booking: &Booking) -> Result<(), DomainError> {
        let taken = self
            .store
            .query_by_resource(&booking.resource_id)
            .await?
            .iter()
            .any(|other| other.booking_id != booking.booking_id && other.occupies_same_slot(booking));

        if taken {
            return Err(ConflictError::SlotTaken {
                resource_id: booking.resource_id.clone(),
                start_time_epoch: booking.start_time_epoch,
            }
            .into());
        }
        Ok(())
    }
}
