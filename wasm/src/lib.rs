//! WebAssembly module for Turf Metrics
//!
//! Provides client-side previews of:
//! - GDD accumulation before a model is saved
//! - Disease risk and growth potential for a single reading
//! - Water balance status and weed pressure scoring

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::calc::{disease, gdd, growth, water, weed};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Degree days for one day
#[wasm_bindgen]
pub fn daily_gdd(tmax: f64, tmin: f64, base_temp: f64) -> f64 {
    gdd::daily_gdd(tmax, tmin, base_temp)
}

/// Input of [`gdd_series_json`]
#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    pub base_temp: f64,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub reset_on_threshold: bool,
    #[serde(default)]
    pub manual_reset_dates: Vec<NaiveDate>,
    pub days: Vec<gdd::GddDay>,
}

/// Accumulate a JSON request into a JSON array of points
pub fn preview_gdd_series(request_json: &str) -> Result<String, String> {
    let request: SeriesRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid series JSON: {}", e))?;

    let mut days = request.days;
    days.sort_by_key(|day| day.date);
    days.dedup_by_key(|day| day.date);
    let manual: BTreeSet<NaiveDate> = request.manual_reset_dates.into_iter().collect();

    let points = gdd::compute_series(
        &days,
        request.base_temp,
        request.threshold,
        request.reset_on_threshold,
        &manual,
    );
    serde_json::to_string(&points).map_err(|e| e.to_string())
}

/// Preview a GDD accumulation from JSON
#[wasm_bindgen]
pub fn gdd_series_json(request_json: &str) -> Result<String, JsValue> {
    preview_gdd_series(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Dollar spot probability from 5-day averages
#[wasm_bindgen]
pub fn smith_kerns_risk(avg_temp_c: f64, avg_rh: f64) -> f64 {
    disease::smith_kerns_risk(avg_temp_c, avg_rh)
}

/// Growth potential for a grass type name (`cold_season`, `warm_season`)
#[wasm_bindgen]
pub fn growth_potential(temp_c: f64, grass_type: &str) -> f64 {
    growth::growth_potential(temp_c, &GrassType::from(grass_type))
}

/// Water balance status name for a period
#[wasm_bindgen]
pub fn water_status(et0: f64, precipitation: f64, irrigation: f64) -> String {
    let (_, status) = water::water_balance(et0, precipitation, irrigation);
    status.to_string()
}

#[wasm_bindgen]
pub fn composite_weed_pressure(
    gdd_risk: f64,
    soil_temp_risk: f64,
    moisture_risk: f64,
    turf_stress: f64,
    seasonal_timing: f64,
) -> f64 {
    weed::composite_weed_pressure(
        gdd_risk,
        soil_temp_risk,
        moisture_risk,
        turf_stress,
        seasonal_timing,
    )
}
