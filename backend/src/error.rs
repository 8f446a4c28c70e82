//! Error handling for the Turf Metrics server
//!
//! Every handler and service returns [`AppResult`]; the HTTP layer renders
//! errors as `{ "error": { "code", "message", "field"? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ValidationError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    // Weather provider errors
    #[error("Weather request failed: {0}")]
    WeatherFetch(String),

    #[error("Weather provider returned {status}: {body}")]
    WeatherStatus { status: u16, body: String },

    #[error("Failed to parse weather response: {0}")]
    WeatherParse(String),

    // Worker pool
    #[error("Recalculation queue is full")]
    QueueFull,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// HTTP status and stable error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::WeatherFetch(_) | AppError::WeatherStatus { .. } => {
                (StatusCode::BAD_GATEWAY, "WEATHER_SERVICE_ERROR")
            }
            AppError::WeatherParse(_) => (StatusCode::BAD_GATEWAY, "WEATHER_PARSE_ERROR"),
            AppError::QueueFull => (StatusCode::SERVICE_UNAVAILABLE, "QUEUE_FULL"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let (message, field) = match &self {
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::Database(_) => ("A database error occurred".to_string(), None),
            AppError::InternalError(_) => ("An internal server error occurred".to_string(), None),
            other => (other.to_string(), None),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
