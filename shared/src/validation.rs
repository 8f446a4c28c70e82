//! Validation utilities for Turf Metrics inputs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CreateGddModel, UpdateGddModel, WeedSpecies};
use crate::types::GpsCoordinates;

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

fn invalid(field: &'static str, message: &'static str) -> ValidationError {
    ValidationError { field, message }
}

// ============================================================================
// GDD Model Validations
// ============================================================================

/// Base temperature must be a finite number
pub fn validate_base_temperature(base_temperature: f64) -> Result<(), ValidationError> {
    if !base_temperature.is_finite() {
        return Err(invalid("base_temperature", "Base temperature must be a finite number"));
    }
    Ok(())
}

/// Threshold must be finite and non-negative; 0 disables threshold resets
pub fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if !threshold.is_finite() {
        return Err(invalid("threshold", "Threshold must be a finite number"));
    }
    if threshold < 0.0 {
        return Err(invalid("threshold", "Threshold cannot be negative"));
    }
    Ok(())
}

pub fn validate_model_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name", "Model name is required"));
    }
    if trimmed.chars().count() > 100 {
        return Err(invalid("name", "Model name must be at most 100 characters"));
    }
    Ok(())
}

/// Validate a new GDD model request
pub fn validate_create_gdd_model(input: &CreateGddModel) -> Result<(), ValidationError> {
    validate_model_name(&input.name)?;
    validate_base_temperature(input.base_temperature)?;
    validate_threshold(input.threshold)?;
    Ok(())
}

/// Validate only the fields an update actually sets
pub fn validate_update_gdd_model(input: &UpdateGddModel) -> Result<(), ValidationError> {
    if let Some(name) = &input.name {
        validate_model_name(name)?;
    }
    if let Some(base) = input.base_temperature {
        validate_base_temperature(base)?;
    }
    if let Some(threshold) = input.threshold {
        validate_threshold(threshold)?;
    }
    Ok(())
}

/// Manual resets must fall strictly after the model start date
pub fn validate_manual_reset_date(
    start_date: NaiveDate,
    reset_date: NaiveDate,
) -> Result<(), ValidationError> {
    if reset_date <= start_date {
        return Err(invalid(
            "date",
            "Manual reset date must be after the model start date",
        ));
    }
    Ok(())
}

// ============================================================================
// Location and Species Validations
// ============================================================================

/// Validate latitude/longitude ranges
pub fn validate_coordinates(coordinates: &GpsCoordinates) -> Result<(), ValidationError> {
    if coordinates.latitude < Decimal::from(-90) || coordinates.latitude > Decimal::from(90) {
        return Err(invalid("latitude", "Latitude must be between -90 and 90"));
    }
    if coordinates.longitude < Decimal::from(-180) || coordinates.longitude > Decimal::from(180) {
        return Err(invalid("longitude", "Longitude must be between -180 and 180"));
    }
    Ok(())
}

/// Emergence threshold must be positive and the soil band ordered
pub fn validate_weed_species(species: &WeedSpecies) -> Result<(), ValidationError> {
    if species.gdd_threshold_emergence <= 0.0 {
        return Err(invalid(
            "gdd_threshold_emergence",
            "Emergence threshold must be positive",
        ));
    }
    if species.optimal_soil_temp_min_c > species.optimal_soil_temp_max_c {
        return Err(invalid(
            "optimal_soil_temp_min_c",
            "Optimal soil temperature minimum exceeds maximum",
        ));
    }
    Ok(())
}
