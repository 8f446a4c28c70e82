//! Weed species and weed pressure models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Part of the year a weed species germinates in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeedSeason {
    Spring,
    Summer,
    Fall,
    YearRound,
}

impl WeedSeason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeedSeason::Spring => "spring",
            WeedSeason::Summer => "summer",
            WeedSeason::Fall => "fall",
            WeedSeason::YearRound => "year_round",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "spring" => Some(WeedSeason::Spring),
            "summer" => Some(WeedSeason::Summer),
            "fall" => Some(WeedSeason::Fall),
            "year_round" => Some(WeedSeason::YearRound),
            _ => None,
        }
    }

    /// Whether `month` (1-12) falls in the active season
    pub fn is_active_in(&self, month: u32) -> bool {
        match self {
            WeedSeason::Spring => (3..=5).contains(&month),
            WeedSeason::Summer => (6..=8).contains(&month),
            WeedSeason::Fall => (9..=11).contains(&month),
            WeedSeason::YearRound => true,
        }
    }
}

/// Emergence parameters for a weed species
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeedSpecies {
    pub id: Uuid,
    pub name: String,
    pub common_name: String,
    pub gdd_base_temp_c: f64,
    pub gdd_threshold_emergence: f64,
    pub optimal_soil_temp_min_c: f64,
    pub optimal_soil_temp_max_c: f64,
    pub season: WeedSeason,
    pub is_active: bool,
}

/// Daily weed pressure for one species at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeedPressurePoint {
    pub location_id: Uuid,
    pub date: NaiveDate,
    pub weed_species_id: Uuid,
    /// Composite score in [0, 10]
    pub weed_pressure_score: f64,
    pub gdd_risk_score: f64,
    pub soil_temp_risk_score: f64,
    pub moisture_risk_score: f64,
    pub turf_stress_score: f64,
    pub seasonal_timing_score: f64,
    pub gdd_accumulated: f64,
    pub soil_temp_estimate_c: f64,
    pub precipitation_3day_mm: f64,
    pub humidity_avg: f64,
    pub et0_mm: f64,
    pub is_forecast: bool,
}
