//! Composite weed emergence pressure
//!
//! Five component scores are weighted into a single 0-10 pressure value per
//! species and day. Species GDD runs restart every 1 January.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use super::gdd::{compute_series, GddDay};
use super::growth::growth_potential;
use crate::models::{DailyObservation, GrassType, WeedPressurePoint, WeedSeason, WeedSpecies};

const W_GDD: f64 = 1.36;
const W_SOIL: f64 = 0.91;
const W_MOISTURE: f64 = 0.91;
const W_TURF: f64 = 0.91;
const W_SEASON: f64 = 0.45;

pub const MAX_WEED_PRESSURE: f64 = 10.0;

const PRECIP_WINDOW_DAYS: usize = 3;
const HUMIDITY_WINDOW_DAYS: usize = 7;

/// Step score of accumulated GDD against the emergence threshold, 0-3
pub fn gdd_risk(accumulated_gdd: f64, emergence_threshold: f64) -> f64 {
    if emergence_threshold <= 0.0 {
        return 0.0;
    }
    let ratio = accumulated_gdd / emergence_threshold;
    if ratio < 0.7 {
        0.0
    } else if ratio < 1.0 {
        1.0
    } else if ratio <= 1.3 {
        2.0
    } else {
        3.0
    }
}

/// Step score of estimated soil temperature against the species band, 0-2
pub fn soil_temp_risk(soil_temp_c: f64, optimal_min_c: f64, optimal_max_c: f64) -> f64 {
    if soil_temp_c < optimal_min_c {
        0.0
    } else if soil_temp_c <= optimal_max_c {
        2.0
    } else if soil_temp_c <= optimal_max_c + 5.0 {
        1.0
    } else {
        0.0
    }
}

/// Precipitation score plus humidity score, 0-2
pub fn moisture_risk(precipitation_3day_mm: f64, humidity_avg: f64) -> f64 {
    let precip = if precipitation_3day_mm > 25.0 {
        1.0
    } else if precipitation_3day_mm > 12.0 {
        0.5
    } else {
        0.0
    };
    let humidity = if humidity_avg > 80.0 {
        1.0
    } else if humidity_avg > 70.0 {
        0.5
    } else {
        0.0
    };
    precip + humidity
}

/// Drought stress plus lost growth potential, capped at 2
pub fn turf_stress(et0_mm: f64, precipitation_mm: f64, growth_potential: f64) -> f64 {
    let deficit = et0_mm - precipitation_mm;
    let drought = if deficit > 5.0 {
        1.0
    } else if deficit > 2.0 {
        0.5
    } else {
        0.0
    };
    (drought + (1.0 - growth_potential)).min(2.0)
}

pub fn seasonal_timing(season: WeedSeason, month: u32) -> f64 {
    if season.is_active_in(month) {
        1.0
    } else {
        0.0
    }
}

/// Soil temperature estimated from air temperature by month
pub fn estimate_soil_temp(air_temp_c: f64, month: u32) -> f64 {
    let factor = match month {
        3..=5 => 0.80,
        6..=8 => 0.90,
        _ => 0.85,
    };
    air_temp_c * factor
}

/// Weighted sum of the component scores, capped at [`MAX_WEED_PRESSURE`]
pub fn composite_weed_pressure(
    gdd_risk: f64,
    soil_temp_risk: f64,
    moisture_risk: f64,
    turf_stress: f64,
    seasonal_timing: f64,
) -> f64 {
    let raw = W_GDD * gdd_risk
        + W_SOIL * soil_temp_risk
        + W_MOISTURE * moisture_risk
        + W_TURF * turf_stress
        + W_SEASON * seasonal_timing;
    raw.min(MAX_WEED_PRESSURE)
}

fn trailing_mean(values: &[f64], i: usize, window: usize) -> f64 {
    let from = (i + 1).saturating_sub(window);
    let slice = &values[from..=i];
    slice.iter().sum::<f64>() / slice.len() as f64
}

fn year_boundaries(window: &[DailyObservation]) -> BTreeSet<NaiveDate> {
    window
        .iter()
        .filter(|obs| obs.date.month() == 1 && obs.date.day() == 1)
        .map(|obs| obs.date)
        .collect()
}

/// Daily pressure points for one species over a resolved weather window
pub fn weed_pressure_points(
    window: &[DailyObservation],
    species: &WeedSpecies,
    grass_type: &GrassType,
) -> Vec<WeedPressurePoint> {
    let days: Vec<GddDay> = window
        .iter()
        .map(|obs| GddDay {
            date: obs.date,
            tmax: obs.temp_max_c,
            tmin: obs.temp_min_c,
        })
        .collect();
    let gdd = compute_series(
        &days,
        species.gdd_base_temp_c,
        0.0,
        false,
        &year_boundaries(window),
    );

    let precipitation: Vec<f64> = window.iter().map(|obs| obs.precipitation_mm).collect();
    let humidity: Vec<f64> = window.iter().map(|obs| obs.humidity_or_default()).collect();

    window
        .iter()
        .zip(gdd)
        .enumerate()
        .map(|(i, (obs, gdd_point))| {
            let month = obs.date.month();
            let air_temp = obs.mean_temp_c();
            let soil_temp = estimate_soil_temp(air_temp, month);
            let precip_from = (i + 1).saturating_sub(PRECIP_WINDOW_DAYS);
            let precipitation_3day: f64 = precipitation[precip_from..=i].iter().sum();
            let humidity_avg = trailing_mean(&humidity, i, HUMIDITY_WINDOW_DAYS);

            let gdd_score = gdd_risk(gdd_point.cumulative_gdd, species.gdd_threshold_emergence);
            let soil_score = soil_temp_risk(
                soil_temp,
                species.optimal_soil_temp_min_c,
                species.optimal_soil_temp_max_c,
            );
            let moisture_score = moisture_risk(precipitation_3day, humidity_avg);
            let stress_score = turf_stress(
                obs.et0_mm,
                obs.precipitation_mm,
                growth_potential(air_temp, grass_type),
            );
            let season_score = seasonal_timing(species.season, month);

            WeedPressurePoint {
                location_id: obs.location_id,
                date: obs.date,
                weed_species_id: species.id,
                weed_pressure_score: composite_weed_pressure(
                    gdd_score,
                    soil_score,
                    moisture_score,
                    stress_score,
                    season_score,
                ),
                gdd_risk_score: gdd_score,
                soil_temp_risk_score: soil_score,
                moisture_risk_score: moisture_score,
                turf_stress_score: stress_score,
                seasonal_timing_score: season_score,
                gdd_accumulated: gdd_point.cumulative_gdd,
                soil_temp_estimate_c: soil_temp,
                precipitation_3day_mm: precipitation_3day,
                humidity_avg,
                et0_mm: obs.et0_mm,
                is_forecast: obs.is_forecast(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdd_risk_steps() {
        assert_eq!(gdd_risk(69.0, 100.0), 0.0);
        assert_eq!(gdd_risk(70.0, 100.0), 1.0);
        assert_eq!(gdd_risk(100.0, 100.0), 2.0);
        assert_eq!(gdd_risk(130.0, 100.0), 2.0);
        assert_eq!(gdd_risk(131.0, 100.0), 3.0);
    }

    #[test]
    fn test_soil_temp_band() {
        assert_eq!(soil_temp_risk(12.0, 13.0, 18.0), 0.0);
        assert_eq!(soil_temp_risk(13.0, 13.0, 18.0), 2.0);
        assert_eq!(soil_temp_risk(23.0, 13.0, 18.0), 1.0);
        assert_eq!(soil_temp_risk(23.5, 13.0, 18.0), 0.0);
    }

    #[test]
    fn test_soil_temp_month_factor() {
        assert_eq!(estimate_soil_temp(20.0, 4), 16.0);
        assert_eq!(estimate_soil_temp(20.0, 7), 18.0);
        assert_eq!(estimate_soil_temp(20.0, 10), 17.0);
    }

    #[test]
    fn test_composite_is_capped() {
        assert_eq!(composite_weed_pressure(3.0, 2.0, 2.0, 2.0, 1.0), MAX_WEED_PRESSURE);
        let low = composite_weed_pressure(1.0, 0.0, 0.0, 0.0, 1.0);
        assert!((low - 1.81).abs() < 1e-9);
    }

    #[test]
    fn test_turf_stress_cap() {
        assert_eq!(turf_stress(10.0, 0.0, 0.0), 2.0);
        assert_eq!(turf_stress(1.0, 0.0, 1.0), 0.0);
        assert_eq!(turf_stress(4.0, 1.0, 1.0), 0.5);
    }
}
