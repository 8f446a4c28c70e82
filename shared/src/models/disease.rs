//! Disease pressure models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Disease key stored for Smith-Kerns dollar spot points
pub const SMITH_KERNS: &str = "smith_kerns";

/// Daily disease risk at a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRiskPoint {
    pub location_id: Uuid,
    pub date: NaiveDate,
    pub disease: String,
    /// Probability in [0, 1]
    pub risk_score: f64,
    pub is_forecast: bool,
}
