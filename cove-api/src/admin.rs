use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cove_core::guests::GuestBooking;
use cove_core::payment::IntentStatus;
use cove_core::property::Reservation;
use cove_order::Order;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ReservationPageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AttachInvoiceRequest {
    pub invoice_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkSyncedRequest {
    pub succeeded: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/orders", get(list_orders))
        .route("/v1/admin/orders/{order_id}", get(get_order).delete(delete_order))
        .route(
            "/v1/admin/orders/{order_id}/items/{item_index}/invoice",
            put(attach_invoice),
        )
        .route("/v1/admin/orders/{order_id}/payment", get(payment_status))
        .route("/v1/admin/reservations", get(list_reservations))
        .route("/v1/admin/reservations/{reservation_id}", get(get_reservation))
        .route(
            "/v1/admin/reservations/{reservation_id}/cancel",
            post(cancel_reservation),
        )
        .route("/v1/admin/guest-bookings", get(list_guest_bookings))
        .route(
            "/v1/admin/guest-bookings/{booking_code}/synced",
            post(mark_booking_synced),
        )
}

// ============================================================================
// Order Handlers
// ============================================================================

async fn list_orders(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders.list_orders(page.limit, page.offset).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, AppError> {
    state
        .orders
        .get_order(&order_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = state.orders.delete_order(&order_id).await?;
    if !deleted {
        return Err(AppError::NotFoundError(format!(
            "Order {} not found",
            order_id
        )));
    }

    info!(order_id = %order_id, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn attach_invoice(
    State(state): State<AppState>,
    Path((order_id, item_index)): Path<(String, usize)>,
    Json(req): Json<AttachInvoiceRequest>,
) -> Result<StatusCode, AppError> {
    if req.invoice_url.trim().is_empty() {
        return Err(AppError::ValidationError(
            "invoice_url must not be empty".to_string(),
        ));
    }

    state
        .orders
        .attach_invoice(&order_id, item_index, &req.invoice_url)
        .await
        .map_err(|e| AppError::NotFoundError(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Live status straight from the payment provider, not a stored copy.
async fn payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<IntentStatus>, AppError> {
    let order = state
        .orders
        .get_order(&order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;

    let intent = state
        .payments
        .get_intent(&order.payment_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(intent))
}

// ============================================================================
// Reservation Handlers (channel manager proxy)
// ============================================================================

async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ReservationPageQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservations = state
        .property
        .list_reservations(query.page)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(reservations))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .property
        .get_reservation(reservation_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    reservation
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Reservation {} not found", reservation_id)))
}

/// There is no un-cancel; the channel manager releases the dates for good.
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .property
        .cancel_reservation(reservation_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    info!(reservation_id, "reservation cancelled by admin");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Guest Registration Handlers
// ============================================================================

async fn list_guest_bookings(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<GuestBooking>>, AppError> {
    let bookings = state.guests.list_bookings(page.limit, page.offset).await?;
    Ok(Json(bookings))
}

async fn mark_booking_synced(
    State(state): State<AppState>,
    Path(booking_code): Path<String>,
    Json(req): Json<MarkSyncedRequest>,
) -> Result<StatusCode, AppError> {
    let existing = state.guests.get_booking(&booking_code).await?;
    if existing.is_none() {
        return Err(AppError::NotFoundError(format!(
            "Booking {} not found",
            booking_code
        )));
    }

    state.guests.mark_synced(&booking_code, req.succeeded).await?;
    Ok(StatusCode::NO_CONTENT)
}
