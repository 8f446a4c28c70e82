//! Daily weather observation models

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relative humidity assumed for a day the provider reported none for
pub const DEFAULT_RELATIVE_HUMIDITY: f64 = 50.0;

/// Whether an observation was measured or predicted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    Historical,
    Forecast,
}

impl ObservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationKind::Historical => "historical",
            ObservationKind::Forecast => "forecast",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "historical" => Some(ObservationKind::Historical),
            "forecast" => Some(ObservationKind::Forecast),
            _ => None,
        }
    }

    /// Kind of a provider day relative to `today`: anything after today is a forecast
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date > today {
            ObservationKind::Forecast
        } else {
            ObservationKind::Historical
        }
    }
}

/// One day of weather at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub kind: ObservationKind,
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

impl DailyObservation {
    /// Daily mean air temperature in Celsius
    pub fn mean_temp_c(&self) -> f64 {
        (self.temp_max_c + self.temp_min_c) / 2.0
    }

    pub fn is_forecast(&self) -> bool {
        self.kind == ObservationKind::Forecast
    }

    /// Mean relative humidity, falling back to [`DEFAULT_RELATIVE_HUMIDITY`]
    pub fn humidity_or_default(&self) -> f64 {
        self.relative_humidity_mean
            .unwrap_or(DEFAULT_RELATIVE_HUMIDITY)
    }
}

/// Collapse observations into one per date, ascending.
///
/// A historical record always wins over a forecast for the same date.
pub fn resolve_observations(observations: Vec<DailyObservation>) -> Vec<DailyObservation> {
    let mut by_date: BTreeMap<NaiveDate, DailyObservation> = BTreeMap::new();
    for obs in observations {
        match by_date.get(&obs.date) {
            Some(existing)
                if existing.kind == ObservationKind::Historical
                    && obs.kind == ObservationKind::Forecast => {}
            _ => {
                by_date.insert(obs.date, obs);
            }
        }
    }
    by_date.into_values().collect()
}
