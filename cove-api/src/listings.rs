use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use cove_core::cart::GuestBreakdown;
use cove_core::property::Fee;
use cove_pricing::prorate_stay;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ListingsQuery {
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct QuoteQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
    adults: u32,
    #[serde(default)]
    children: u32,
    #[serde(default)]
    infants: u32,
    #[serde(default)]
    pets: u32,
}

/// Quote for the booking widget, fees already adjusted for the tax cap.
#[derive(Debug, Serialize)]
struct QuoteResponse {
    listing_id: i64,
    currency: String,
    nights: u32,
    nightly_total: f64,
    total: f64,
    deducted: f64,
    fees: Vec<Fee>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/listings", get(list_listings))
        .route("/v1/listings/{listing_id}", get(get_listing))
        .route("/v1/listings/{listing_id}/quote", get(quote_listing))
}

async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let listings = state
        .property
        .list_listings(query.page)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(listings))
}

async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let listing = state
        .property
        .get_listing(listing_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    match listing {
        Some(listing) => Ok(Json(listing)),
        None => Err(AppError::NotFoundError(format!(
            "Listing {} not found",
            listing_id
        ))),
    }
}

async fn quote_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<i64>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, AppError> {
    if query.end_date <= query.start_date {
        return Err(AppError::ValidationError(
            "end_date must be after start_date".to_string(),
        ));
    }
    if query.adults == 0 {
        return Err(AppError::ValidationError(
            "at least one adult is required".to_string(),
        ));
    }

    let nights = (query.end_date - query.start_date).num_days() as u32;
    let guests = GuestBreakdown {
        adults: query.adults,
        children: query.children,
        infants: query.infants,
        pets: query.pets,
    };

    let quote = state
        .property
        .quote_stay(listing_id, query.start_date, query.end_date, &guests)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    let priced = prorate_stay(&quote, query.adults, nights);

    Ok(Json(QuoteResponse {
        listing_id,
        currency: priced.currency,
        nights,
        nightly_total: quote.nightly_total,
        total: priced.total,
        deducted: priced.deducted,
        fees: priced.fees,
    }))
}
