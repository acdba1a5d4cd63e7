use async_trait::async_trait;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    Booking, BookingId, ResourceId, Result, StoreError, UserId, Version,
    store::{BookingStore, PutCondition},
};

const PRIMARY_KEY_CONSTRAINT: &str = "bookings_pkey";
const SLOT_CONSTRAINT: &str = "unique_resource_slot";

/// PostgreSQL-backed booking store implementation.
///
/// Conditional writes are expressed as single statements, so the database's
/// primary key and `unique_resource_slot` constraint serialize concurrent
/// writers across any number of service instances.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgreSQL booking store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `database_url` with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_booking(row: PgRow) -> Result<Booking> {
        Ok(Booking {
            booking_id: BookingId::new(row.try_get::<String, _>("booking_id")?),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            resource_id: ResourceId::new(row.try_get::<String, _>("resource_id")?),
            start_time_epoch: row.try_get("start_time_epoch")?,
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
        })
    }

    /// Translates constraint violations into store errors.
    fn map_write_error(e: sqlx::Error, booking: &Booking) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.constraint() {
                Some(PRIMARY_KEY_CONSTRAINT) => {
                    return StoreError::ConditionFailed {
                        booking_id: booking.booking_id.clone(),
                    };
                }
                Some(SLOT_CONSTRAINT) => {
                    return StoreError::SlotTaken {
                        resource_id: booking.resource_id.clone(),
                        start_time_epoch: booking.start_time_epoch,
                    };
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    }

    async fn insert(&self, booking: &Booking) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (booking_id, user_id, resource_id, start_time_epoch, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING booking_id, user_id, resource_id, start_time_epoch, version, created_at
            "#,
        )
        .bind(booking.booking_id.as_str())
        .bind(booking.user_id.as_str())
        .bind(booking.resource_id.as_str())
        .bind(booking.start_time_epoch)
        .bind(Version::first().as_i64())
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, booking))?;

        Self::row_to_booking(row)
    }

    async fn replace(&self, booking: &Booking, expected: Version) -> Result<Booking> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            UPDATE bookings
            SET user_id = $2, resource_id = $3, start_time_epoch = $4, version = version + 1, updated_at = NOW()
            WHERE booking_id = $1 AND version = $5
            RETURNING booking_id, user_id, resource_id, start_time_epoch, version, created_at
            "#,
        )
        .bind(booking.booking_id.as_str())
        .bind(booking.user_id.as_str())
        .bind(booking.resource_id.as_str())
        .bind(booking.start_time_epoch)
        .bind(expected.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, booking))?;

        match row {
            Some(row) => Self::row_to_booking(row),
            None => Err(StoreError::ConditionFailed {
                booking_id: booking.booking_id.clone(),
            }),
        }
    }

    async fn upsert(&self, booking: &Booking) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (booking_id, user_id, resource_id, start_time_epoch, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, $5, NOW())
            ON CONFLICT (booking_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                resource_id = EXCLUDED.resource_id,
                start_time_epoch = EXCLUDED.start_time_epoch,
                version = bookings.version + 1,
                updated_at = NOW()
            RETURNING booking_id, user_id, resource_id, start_time_epoch, version, created_at
            "#,
        )
        .bind(booking.booking_id.as_str())
        .bind(booking.user_id.as_str())
        .bind(booking.resource_id.as_str())
        .bind(booking.start_time_epoch)
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, booking))?;

        Self::row_to_booking(row)
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn get(&self, booking_id: &BookingId) -> Result<Option<Booking>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT booking_id, user_id, resource_id, start_time_epoch, version, created_at
            FROM bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_booking).transpose()
    }

    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.booking_id))]
    async fn put(&self, booking: Booking, condition: PutCondition) -> Result<Booking> {
        match condition {
            PutCondition::MustNotExist => self.insert(&booking).await,
            PutCondition::ExpectVersion(expected) => self.replace(&booking, expected).await,
            PutCondition::Always => self.upsert(&booking).await,
        }
    }

    async fn delete(&self, booking_id: &BookingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(booking_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_by_user(&self, user_id: &UserId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT booking_id, user_id, resource_id, start_time_epoch, version, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at ASC, booking_id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn query_by_resource(&self, resource_id: &ResourceId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT booking_id, user_id, resource_id, start_time_epoch, version, created_at
            FROM bookings
            WHERE resource_id = $1
            ORDER BY created_at ASC, booking_id ASC
            "#,
        )
        .bind(resource_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }
}
