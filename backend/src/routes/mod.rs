//! Route definitions for the Turf Metrics server

use axum::{
    routing::{delete, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/locations/:id/recalculate",
            post(handlers::recalculate_location),
        )
        .nest("/gdd-models", gdd_model_routes())
}

/// GDD model and reset ledger routes
fn gdd_model_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_model))
        .route("/:id", put(handlers::update_model))
        .route("/:id/recalculate", post(handlers::recalculate_model))
        .route(
            "/:id/resets",
            post(handlers::create_reset).delete(handlers::delete_resets_by_type),
        )
        .route("/:id/resets/:reset_id", delete(handlers::delete_reset))
}
