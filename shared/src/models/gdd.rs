//! Growing degree day models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TemperatureUnit;

/// A GDD model tracked for a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GddModelConfig {
    pub id: Uuid,
    pub location_id: Uuid,
    pub name: String,
    pub base_temperature: f64,
    pub unit: TemperatureUnit,
    pub start_date: NaiveDate,
    /// Threshold that ends a run when `reset_on_threshold` is set; 0 disables it
    pub threshold: f64,
    pub reset_on_threshold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a run started
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResetType {
    Initial,
    Manual,
    Threshold,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetType::Initial => "initial",
            ResetType::Manual => "manual",
            ResetType::Threshold => "threshold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initial" => Some(ResetType::Initial),
            "manual" => Some(ResetType::Manual),
            "threshold" => Some(ResetType::Threshold),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry in a model's reset ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetEvent {
    pub id: Uuid,
    pub model_id: Uuid,
    pub date: NaiveDate,
    pub reset_type: ResetType,
    pub run_number: i32,
}

impl ResetEvent {
    /// Ledger entries are identified by (model, date), so the id is derived from both
    pub fn event_id(model_id: Uuid, date: NaiveDate) -> Uuid {
        Uuid::new_v5(&model_id, date.to_string().as_bytes())
    }

    pub fn new(model_id: Uuid, date: NaiveDate, reset_type: ResetType, run_number: i32) -> Self {
        Self {
            id: Self::event_id(model_id, date),
            model_id,
            date,
            reset_type,
            run_number,
        }
    }
}

/// One day of a model's accumulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GddValue {
    pub model_id: Uuid,
    pub date: NaiveDate,
    pub daily_gdd: f64,
    pub cumulative_gdd: f64,
    pub run: i32,
    pub is_forecast: bool,
}

/// Request to create a GDD model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGddModel {
    pub location_id: Uuid,
    pub name: String,
    pub base_temperature: f64,
    #[serde(default)]
    pub unit: TemperatureUnit,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub reset_on_threshold: bool,
}

/// Partial update of a GDD model; any change triggers a full recomputation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGddModel {
    pub name: Option<String>,
    pub base_temperature: Option<f64>,
    pub unit: Option<TemperatureUnit>,
    pub start_date: Option<NaiveDate>,
    pub threshold: Option<f64>,
    pub reset_on_threshold: Option<bool>,
}

impl GddModelConfig {
    /// Apply `update` in place, returning whether anything changed
    pub fn apply(&mut self, update: UpdateGddModel) -> bool {
        let before = self.clone();
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(base) = update.base_temperature {
            self.base_temperature = base;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(start) = update.start_date {
            self.start_date = start;
        }
        if let Some(threshold) = update.threshold {
            self.threshold = threshold;
        }
        if let Some(flag) = update.reset_on_threshold {
            self.reset_on_threshold = flag;
        }
        *self != before
    }
}

/// Request to record a manual reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManualReset {
    pub date: NaiveDate,
}
