//! Growth potential models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily turfgrass growth potential at a location
///
/// Rolling averages are `None` until their trailing window is full.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthPotentialPoint {
    pub location_id: Uuid,
    pub date: NaiveDate,
    pub growth_potential: f64,
    pub gp_3d_avg: Option<f64>,
    pub gp_5d_avg: Option<f64>,
    pub gp_7d_avg: Option<f64>,
    pub is_forecast: bool,
}
