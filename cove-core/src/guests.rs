use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identity details for one traveller, collected after checkout for
/// registration with the local authorities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestIdentity {
    pub first_name: String,
    pub last_name: String,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub nationality: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Per-booking guest registration record, keyed by the reservation's
/// confirmation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestBooking {
    pub booking_code: String,
    pub listing_id: i64,
    pub guests: Vec<GuestIdentity>,
    /// Whether the current guest list has been pushed upstream.
    pub synced: bool,
    /// Whether the last upstream push was accepted.
    pub succeeded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuestBooking {
    pub fn new(booking_code: String, listing_id: i64) -> Self {
        let now = Utc::now();
        GuestBooking {
            booking_code,
            listing_id,
            guests: Vec::new(),
            synced: false,
            succeeded: false,
            created_at: now,
            updated_at: now,
        }
    }
}
