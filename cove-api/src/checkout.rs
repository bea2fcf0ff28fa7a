use axum::{extract::State, routing::post, Json, Router};
use cove_order::{CheckoutError, CheckoutOutcome, CheckoutRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkout", post(buy_cart))
}

async fn buy_cart(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutOutcome>, AppError> {
    let outcome = state
        .checkout
        .buy_cart(request)
        .await
        .map_err(|e| match e {
            CheckoutError::EmptyCart => AppError::ValidationError(e.to_string()),
            CheckoutError::Pricing { .. }
            | CheckoutError::Reservation { .. }
            | CheckoutError::Transaction { .. }
            | CheckoutError::Payment { .. } => AppError::UpstreamError(e.to_string()),
            CheckoutError::Store { .. } | CheckoutError::Persistence { .. } => {
                AppError::InternalServerError(e.to_string())
            }
        })?;

    Ok(Json(outcome))
}
