//! Common types used across the platform

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Temperature unit a GDD model is configured in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    C,
    F,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::C => "C",
            TemperatureUnit::F => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "C" | "c" => Some(TemperatureUnit::C),
            "F" | "f" => Some(TemperatureUnit::F),
            _ => None,
        }
    }

    /// Express a Celsius reading in this unit
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::C => celsius,
            TemperatureUnit::F => celsius_to_fahrenheit(celsius),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "°{}", self.as_str())
    }
}

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert millimeters to inches
pub fn mm_to_inches(mm: f64) -> f64 {
    mm / 25.4
}

/// Inclusive date range for queries and replace-writes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range, zero when inverted
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// Split into consecutive sub-ranges of at most `chunk_days` days
    pub fn chunks(&self, chunk_days: i64) -> Vec<DateRange> {
        let chunk_days = chunk_days.max(1);
        let mut chunks = Vec::new();
        let mut start = self.start;
        while start <= self.end {
            let end = (start + chrono::Duration::days(chunk_days - 1)).min(self.end);
            chunks.push(DateRange::new(start, end));
            start = end + chrono::Duration::days(1);
        }
        chunks
    }
}
