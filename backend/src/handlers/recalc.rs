//! On-demand recalculation handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::RecalcJob;
use crate::AppState;

/// Body returned when a job is accepted
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: &'static str,
    pub id: Uuid,
}

impl QueuedResponse {
    pub fn new(job: RecalcJob, id: Uuid) -> Self {
        Self {
            queued: job.task_name(),
            id,
        }
    }
}

/// Queue a full recalculation of a location
pub async fn recalculate_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.get_location(location_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return AppError::NotFound("Location".to_string()).into_response(),
        Err(e) => return e.into_response(),
    }

    let job = RecalcJob::Location(location_id);
    match state.pool.submit(job) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(QueuedResponse::new(job, location_id)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
