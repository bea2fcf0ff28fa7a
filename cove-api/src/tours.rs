use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    start: NaiveDate,
    end: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tours/{activity_id}", get(get_tour))
        .route(
            "/v1/tours/{activity_id}/availabilities",
            get(list_availabilities),
        )
}

async fn get_tour(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let activity = state
        .tours
        .get_activity(activity_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(activity))
}

async fn list_availabilities(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    if query.end < query.start {
        return Err(AppError::ValidationError(
            "end must not be before start".to_string(),
        ));
    }

    let availabilities = state
        .tours
        .list_availabilities(activity_id, query.start, query.end)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    Ok(Json(availabilities))
}
