//! GDD model and reset ledger HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{CreateGddModel, CreateManualReset, ResetType, UpdateGddModel};
use uuid::Uuid;

use super::recalc::QueuedResponse;
use crate::error::AppError;
use crate::services::RecalcJob;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetTypeQuery {
    #[serde(rename = "type")]
    pub reset_type: String,
}

/// Create a GDD model
pub async fn create_model(
    State(state): State<AppState>,
    Json(input): Json<CreateGddModel>,
) -> impl IntoResponse {
    match state.gdd.create_model(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a GDD model's parameters
pub async fn update_model(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    Json(input): Json<UpdateGddModel>,
) -> impl IntoResponse {
    match state.gdd.update_model(model_id, input).await {
        Ok(model) => (StatusCode::OK, Json(model)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Queue a recomputation of one model
pub async fn recalculate_model(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.gdd.recalculate_model(model_id).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(QueuedResponse::new(RecalcJob::GddModel(model_id), model_id)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a manual reset
pub async fn create_reset(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    Json(input): Json<CreateManualReset>,
) -> impl IntoResponse {
    match state.gdd.create_manual_reset(model_id, input.date).await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete one reset by id
pub async fn delete_reset(
    State(state): State<AppState>,
    Path((model_id, reset_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    match state.gdd.delete_reset(model_id, reset_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete every reset of one type
pub async fn delete_resets_by_type(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    Query(query): Query<ResetTypeQuery>,
) -> impl IntoResponse {
    let reset_type = match ResetType::parse(&query.reset_type) {
        Some(reset_type) => reset_type,
        None => {
            return AppError::Validation {
                field: "type".to_string(),
                message: format!("Unknown reset type '{}'", query.reset_type),
            }
            .into_response()
        }
    };

    match state.gdd.delete_resets_of_type(model_id, reset_type).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "deleted": deleted })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
