//! Location, lawn and irrigation models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsCoordinates;

/// A geographic point weather is collected for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub coordinates: GpsCoordinates,
}

/// Turfgrass category driving the growth potential curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum GrassType {
    CoolSeason,
    WarmSeason,
    /// Anything the calculators do not know about
    Unrecognized(String),
}

impl GrassType {
    pub fn as_str(&self) -> &str {
        match self {
            GrassType::CoolSeason => "cold_season",
            GrassType::WarmSeason => "warm_season",
            GrassType::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for GrassType {
    fn from(value: &str) -> Self {
        match value {
            "cold_season" | "cool_season" => GrassType::CoolSeason,
            "warm_season" => GrassType::WarmSeason,
            other => GrassType::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for GrassType {
    fn from(value: String) -> Self {
        GrassType::from(value.as_str())
    }
}

impl From<GrassType> for String {
    fn from(value: GrassType) -> Self {
        value.as_str().to_string()
    }
}

/// A lawn at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lawn {
    pub id: Uuid,
    pub location_id: Uuid,
    pub name: String,
    pub grass_type: GrassType,
    pub weather_enabled: bool,
}

/// Water applied to a lawn on a day, in inches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrrigationEntry {
    pub id: Uuid,
    pub lawn_id: Uuid,
    pub date: NaiveDate,
    pub amount_in: f64,
}
