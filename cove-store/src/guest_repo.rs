use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_core::guests::{GuestBooking, GuestIdentity};
use cove_core::repository::GuestRepository;
use sqlx::{FromRow, PgPool};

pub struct PgGuestRepository {
    pool: PgPool,
}

impl PgGuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct GuestBookingRow {
    booking_code: String,
    listing_id: i64,
    guests: serde_json::Value,
    synced: bool,
    succeeded: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GuestBookingRow {
    fn into_booking(self) -> Result<GuestBooking, serde_json::Error> {
        Ok(GuestBooking {
            booking_code: self.booking_code,
            listing_id: self.listing_id,
            guests: serde_json::from_value(self.guests)?,
            synced: self.synced,
            succeeded: self.succeeded,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "booking_code, listing_id, guests, synced, succeeded, created_at, updated_at";

#[async_trait]
impl GuestRepository for PgGuestRepository {
    async fn create_booking(
        &self,
        booking: &GuestBooking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO guest_bookings (booking_code, listing_id, guests, synced, succeeded, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&booking.booking_code)
        .bind(booking.listing_id)
        .bind(serde_json::to_value(&booking.guests)?)
        .bind(booking.synced)
        .bind(booking.succeeded)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_booking(
        &self,
        booking_code: &str,
    ) -> Result<Option<GuestBooking>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, GuestBookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM guest_bookings WHERE booking_code = $1"
        ))
        .bind(booking_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(GuestBookingRow::into_booking).transpose()?)
    }

    async fn append_guests(
        &self,
        booking_code: &str,
        guests: &[GuestIdentity],
    ) -> Result<GuestBooking, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, GuestBookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM guest_bookings WHERE booking_code = $1"
        ))
        .bind(booking_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| format!("booking {booking_code} not found"))?;

        let mut booking = row.into_booking()?;
        booking.guests.extend_from_slice(guests);
        booking.synced = false;
        booking.updated_at = Utc::now();

        sqlx::query(
            "UPDATE guest_bookings SET guests = $2, synced = FALSE, updated_at = $3 \
             WHERE booking_code = $1",
        )
        .bind(booking_code)
        .bind(serde_json::to_value(&booking.guests)?)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn list_bookings(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GuestBooking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, GuestBookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM guest_bookings ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|row| row.into_booking().map_err(Into::into)).collect()
    }

    async fn mark_synced(
        &self,
        booking_code: &str,
        succeeded: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "UPDATE guest_bookings SET synced = TRUE, succeeded = $2, updated_at = $3 \
             WHERE booking_code = $1",
        )
        .bind(booking_code)
        .bind(succeeded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
