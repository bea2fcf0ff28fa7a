use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use cove_core::guests::{GuestBooking, GuestIdentity};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterGuestsRequest {
    guests: Vec<GuestIdentity>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings/{booking_code}/guests", post(register_guests))
}

/// Guests fill in their identity documents after booking; every submission
/// flags the record for a fresh registry sync.
async fn register_guests(
    State(state): State<AppState>,
    Path(booking_code): Path<String>,
    Json(req): Json<RegisterGuestsRequest>,
) -> Result<Json<GuestBooking>, AppError> {
    if req.guests.is_empty() {
        return Err(AppError::ValidationError(
            "at least one guest is required".to_string(),
        ));
    }

    let existing = state.guests.get_booking(&booking_code).await?;
    if existing.is_none() {
        return Err(AppError::NotFoundError(format!(
            "Booking {} not found",
            booking_code
        )));
    }

    let updated = state.guests.append_guests(&booking_code, &req.guests).await?;

    info!(
        booking_code = %updated.booking_code,
        guests = updated.guests.len(),
        "guest identities registered"
    );

    Ok(Json(updated))
}
