use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cart::GuestBreakdown;

/// One fee line on a quote, as priced by the channel manager.
/// `quantity` is the number of billable units (for a city tax: person-nights).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fee {
    pub fee_id: Option<i64>,
    pub fee_name: String,
    pub quantity: f64,
    pub total: f64,
    pub total_net: f64,
    pub total_tax: f64,
    #[serde(default)]
    pub inclusive_percent: f64,
}

/// Priced stay returned by the channel manager for a listing and date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayQuote {
    pub listing_id: i64,
    pub currency: String,
    /// Accommodation fare before fees.
    pub nightly_total: f64,
    pub fees: Vec<Fee>,
    /// Grand total as quoted, fees included.
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    AwaitingPayment,
    Accepted,
    Cancelled,
    Denied,
    Deleted,
}

impl ReservationStatus {
    /// Map the channel manager's status string; unknown strings fall back to Pending.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" | "new" => ReservationStatus::Pending,
            "awaiting_payment" | "awaiting payment" => ReservationStatus::AwaitingPayment,
            "accepted" | "confirmed" => ReservationStatus::Accepted,
            "cancelled" | "canceled" => ReservationStatus::Cancelled,
            "denied" | "declined" => ReservationStatus::Denied,
            "deleted" => ReservationStatus::Deleted,
            other => {
                tracing::warn!(status = other, "unrecognised reservation status");
                ReservationStatus::Pending
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Denied | ReservationStatus::Deleted
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::AwaitingPayment => "awaiting_payment",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Denied => "denied",
            ReservationStatus::Deleted => "deleted",
        };
        write!(f, "{}", label)
    }
}

/// Contact details attached to a reservation at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything the channel manager needs to open a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub listing_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest: GuestContact,
    pub guests: GuestBreakdown,
    /// Charge amount after fee adjustments, in major units.
    pub total: f64,
    pub currency: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedReservation {
    pub reservation_id: i64,
    pub confirmation_code: String,
    pub status: ReservationStatus,
}

/// Reservation as read back from the channel manager (admin views).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: i64,
    pub confirmation_code: String,
    pub listing_id: i64,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub reservation_id: i64,
    pub amount: f64,
    pub currency: String,
    /// Channel manager transaction type, e.g. "accommodation".
    pub kind: String,
    pub notes: Option<String>,
}

/// Client seam for the property management system. Listing payloads stay
/// opaque (`Value`) so storefront fields pass through without a schema here.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list_listings(
        &self,
        page: u32,
    ) -> Result<Vec<Value>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_listing(
        &self,
        listing_id: i64,
    ) -> Result<Option<Value>, Box<dyn std::error::Error + Send + Sync>>;

    /// Price a stay for the given dates and party.
    async fn quote_stay(
        &self,
        listing_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        guests: &GuestBreakdown,
    ) -> Result<StayQuote, Box<dyn std::error::Error + Send + Sync>>;

    async fn create_reservation(
        &self,
        draft: &ReservationDraft,
    ) -> Result<CreatedReservation, Box<dyn std::error::Error + Send + Sync>>;

    /// Record a payment transaction against a reservation. Returns the
    /// channel manager's transaction id.
    async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_reservations(
        &self,
        page: u32,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    async fn cancel_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
