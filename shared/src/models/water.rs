//! Water management models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Water balance classification for a period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaterStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl WaterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterStatus::Excellent => "excellent",
            WaterStatus::Good => "good",
            WaterStatus::Warning => "warning",
            WaterStatus::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "excellent" => Some(WaterStatus::Excellent),
            "good" => Some(WaterStatus::Good),
            "warning" => Some(WaterStatus::Warning),
            "critical" => Some(WaterStatus::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monday-to-Sunday water balance for a lawn. Amounts are in inches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterWeekSummary {
    pub lawn_id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
    pub et0_total: f64,
    pub precipitation_total: f64,
    pub irrigation_applied: f64,
    pub water_deficit: f64,
    pub status: WaterStatus,
    pub is_forecast: bool,
}
