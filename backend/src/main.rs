//! Turf Metrics - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turf_backend::{
    create_app,
    external::OpenMeteoClient,
    services::{RecalcPool, RecalcService, RecalcSettings, Scheduler, WeatherService},
    store::{PgStore, Store},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "turf_server=debug,turf_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Turf Metrics Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool));
    let source = Arc::new(OpenMeteoClient::new(&config.weather)?);
    let weather = WeatherService::new(Arc::clone(&store), source);
    let recalc = Arc::new(RecalcService::new(
        Arc::clone(&store),
        weather,
        RecalcSettings {
            lookback_days: config.scheduler.lookback_days,
            forecast_days: config.weather.forecast_days,
        },
    ));

    let (pool, _workers) = RecalcPool::start(
        Arc::clone(&recalc),
        config.workers.pool_size,
        config.workers.queue_capacity,
    );

    if config.scheduler.enabled {
        Scheduler::new(
            Arc::clone(&recalc),
            config.scheduler.clone(),
            config.weather.clone(),
        )
        .spawn();
    } else {
        tracing::info!("Periodic weather cycle disabled");
    }

    // Build application
    let app = create_app(AppState::new(store, pool));

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server host '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
