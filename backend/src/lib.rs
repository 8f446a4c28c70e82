//! Turf Metrics - Backend
//!
//! Ingests daily weather per location and keeps the derived agronomic series
//! (GDD accumulation, disease risk, growth potential, weed pressure, water
//! balance) in step with weather, model configuration and reset commands.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{GddModelService, RecalcPool};
use store::Store;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gdd: GddModelService,
    pub pool: RecalcPool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, pool: RecalcPool) -> Self {
        Self {
            gdd: GddModelService::new(Arc::clone(&store), pool.clone()),
            store,
            pool,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Turf Metrics API v1.0"
}
