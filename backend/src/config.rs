//! Configuration management for the Turf Metrics server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TURF_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Open-Meteo configuration
    pub weather: WeatherConfig,

    /// Periodic cycle configuration
    pub scheduler: SchedulerConfig,

    /// On-demand recalculation pool
    pub workers: WorkerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Forecast endpoint (past and forecast days in one call)
    pub forecast_url: String,

    /// Historical archive endpoint
    pub archive_url: String,

    pub forecast_days: u32,

    /// Past days requested by the start-up cycle
    pub startup_past_days: u32,

    /// Past days requested by the daily cycle
    pub recurring_past_days: u32,

    /// Days per archive request
    pub chunk_days: u32,

    /// Pause between archive requests
    pub chunk_delay_ms: u64,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// Hour (UTC) the daily cycle runs at
    pub update_hour_utc: u32,

    /// Delay before the start-up cycle
    pub startup_delay_secs: u64,

    /// Days of history the location-level series cover
    pub lookback_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    pub pool_size: usize,
    pub queue_capacity: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("TURF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("weather.forecast_url", "https://api.open-meteo.com/v1/forecast")?
            .set_default(
                "weather.archive_url",
                "https://archive-api.open-meteo.com/v1/archive",
            )?
            .set_default("weather.forecast_days", 16)?
            .set_default("weather.startup_past_days", 60)?
            .set_default("weather.recurring_past_days", 2)?
            .set_default("weather.chunk_days", 45)?
            .set_default("weather.chunk_delay_ms", 1000)?
            .set_default("weather.timeout_secs", 30)?
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.update_hour_utc", 6)?
            .set_default("scheduler.startup_delay_secs", 10)?
            .set_default("scheduler.lookback_days", 60)?
            .set_default("workers.pool_size", 2)?
            .set_default("workers.queue_capacity", 64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TURF_ prefix)
            .add_source(
                Environment::with_prefix("TURF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            forecast_days: 16,
            startup_past_days: 60,
            recurring_past_days: 2,
            chunk_days: 45,
            chunk_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_hour_utc: 6,
            startup_delay_secs: 10,
            lookback_days: 60,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: 2,
            queue_capacity: 64,
        }
    }
}
