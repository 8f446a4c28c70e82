//! Open-Meteo client for daily weather
//!
//! The forecast endpoint returns past and forecast days in one call; the
//! archive endpoint serves long historical ranges and is queried in chunks
//! with a pause between requests.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use shared::{DateRange, GpsCoordinates};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,\
precipitation_probability_max,windspeed_10m_max,windgusts_10m_max,\
winddirection_10m_dominant,et0_fao_evapotranspiration,\
relative_humidity_2m_mean,relative_humidity_2m_max,relative_humidity_2m_min,\
dew_point_2m_max,dew_point_2m_min,dew_point_2m_mean,sunshine_duration";

/// One provider day, before it is tied to a location
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_max: f64,
    pub wind_speed_max_ms: f64,
    pub wind_gusts_max_ms: f64,
    pub wind_direction_dominant_deg: f64,
    pub et0_mm: f64,
    pub relative_humidity_mean: Option<f64>,
    pub relative_humidity_max: Option<f64>,
    pub relative_humidity_min: Option<f64>,
    pub dew_point_max_c: Option<f64>,
    pub dew_point_min_c: Option<f64>,
    pub dew_point_mean_c: Option<f64>,
    pub sunshine_duration_s: Option<f64>,
}

/// Source of daily weather for a coordinate
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Recent past days plus forecast days in one request
    async fn fetch_recent(
        &self,
        coordinates: &GpsCoordinates,
        past_days: u32,
        forecast_days: u32,
    ) -> AppResult<Vec<WeatherDay>>;

    /// Measured days over an inclusive range
    async fn fetch_historical(
        &self,
        coordinates: &GpsCoordinates,
        range: DateRange,
    ) -> AppResult<Vec<WeatherDay>>;
}

/// Open-Meteo API response; only the `daily` block is used
#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub daily: OpenMeteoDaily,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenMeteoDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub windgusts_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub winddirection_10m_dominant: Vec<Option<f64>>,
    #[serde(default)]
    pub et0_fao_evapotranspiration: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub dew_point_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub dew_point_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub dew_point_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub sunshine_duration: Vec<Option<f64>>,
}

/// Value at `i` if present and finite
fn optional(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Value at `i`, 0 when missing
fn required(values: &[Option<f64>], i: usize) -> f64 {
    optional(values, i).unwrap_or(0.0)
}

/// Convert the column-oriented `daily` block into days. Unparsable dates are skipped.
pub fn parse_daily(daily: &OpenMeteoDaily) -> Vec<WeatherDay> {
    daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => {
                    tracing::warn!(date = %raw, "skipping unparsable weather date");
                    return None;
                }
            };
            Some(WeatherDay {
                date,
                temp_max_c: required(&daily.temperature_2m_max, i),
                temp_min_c: required(&daily.temperature_2m_min, i),
                precipitation_mm: required(&daily.precipitation_sum, i),
                precipitation_probability_max: required(&daily.precipitation_probability_max, i),
                wind_speed_max_ms: required(&daily.windspeed_10m_max, i),
                wind_gusts_max_ms: required(&daily.windgusts_10m_max, i),
                wind_direction_dominant_deg: required(&daily.winddirection_10m_dominant, i),
                et0_mm: required(&daily.et0_fao_evapotranspiration, i),
                relative_humidity_mean: optional(&daily.relative_humidity_2m_mean, i),
                relative_humidity_max: optional(&daily.relative_humidity_2m_max, i),
                relative_humidity_min: optional(&daily.relative_humidity_2m_min, i),
                dew_point_max_c: optional(&daily.dew_point_2m_max, i),
                dew_point_min_c: optional(&daily.dew_point_2m_min, i),
                dew_point_mean_c: optional(&daily.dew_point_2m_mean, i),
                sunshine_duration_s: optional(&daily.sunshine_duration, i),
            })
        })
        .collect()
}

/// Parse a raw response body
pub fn parse_response(body: &str) -> AppResult<Vec<WeatherDay>> {
    let response: OpenMeteoResponse =
        serde_json::from_str(body).map_err(|e| AppError::WeatherParse(e.to_string()))?;
    Ok(parse_daily(&response.daily))
}

/// Concatenate chunk results keeping the first day seen per date, ascending
pub fn merge_chunks(chunks: Vec<Vec<WeatherDay>>) -> Vec<WeatherDay> {
    let mut by_date: BTreeMap<NaiveDate, WeatherDay> = BTreeMap::new();
    for day in chunks.into_iter().flatten() {
        by_date.entry(day.date).or_insert(day);
    }
    by_date.into_values().collect()
}

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
    archive_url: String,
    chunk_days: u32,
    chunk_delay: Duration,
}

impl OpenMeteoClient {
    /// Create a client from the weather configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            forecast_url: config.forecast_url.clone(),
            archive_url: config.archive_url.clone(),
            chunk_days: config.chunk_days,
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
        })
    }

    async fn get_daily(&self, url: &str, query: &[(&str, String)]) -> AppResult<Vec<WeatherDay>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::WeatherFetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WeatherStatus { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::WeatherFetch(e.to_string()))?;
        parse_response(&body)
    }
}

fn coordinate_query(coordinates: &GpsCoordinates) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", format!("{:.4}", coordinates.latitude)),
        ("longitude", format!("{:.4}", coordinates.longitude)),
        ("daily", DAILY_FIELDS.to_string()),
        ("timezone", "auto".to_string()),
    ]
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_recent(
        &self,
        coordinates: &GpsCoordinates,
        past_days: u32,
        forecast_days: u32,
    ) -> AppResult<Vec<WeatherDay>> {
        let mut query = coordinate_query(coordinates);
        query.push(("past_days", past_days.to_string()));
        query.push(("forecast_days", forecast_days.to_string()));

        let days = self.get_daily(&self.forecast_url, &query).await?;
        tracing::debug!(days = days.len(), past_days, forecast_days, "fetched recent weather");
        Ok(days)
    }

    async fn fetch_historical(
        &self,
        coordinates: &GpsCoordinates,
        range: DateRange,
    ) -> AppResult<Vec<WeatherDay>> {
        let chunks = range.chunks(self.chunk_days as i64);
        let mut results = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }
            let mut query = coordinate_query(coordinates);
            query.push(("start_date", chunk.start.to_string()));
            query.push(("end_date", chunk.end.to_string()));

            let days = self.get_daily(&self.archive_url, &query).await?;
            tracing::debug!(
                start = %chunk.start,
                end = %chunk.end,
                days = days.len(),
                "fetched historical weather chunk"
            );
            results.push(days);
        }

        Ok(merge_chunks(results))
    }
}
