//! Smith-Kerns dollar spot risk model

use crate::models::{DailyObservation, DiseaseRiskPoint, SMITH_KERNS};

const SK_B0: f64 = -11.4041;
const SK_B1: f64 = 0.1932;
const SK_B2: f64 = 0.0894;

/// Trailing window the model averages temperature and humidity over
pub const DISEASE_WINDOW_DAYS: usize = 5;

/// Inputs the model needs for one day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseDay {
    pub mean_temp_c: f64,
    pub relative_humidity: f64,
}

/// Dollar spot probability from 5-day mean temperature (°C) and humidity (%).
///
/// Zero outside the 10-35 °C band the regression was fitted on.
pub fn smith_kerns_risk(avg_temp_c: f64, avg_rh: f64) -> f64 {
    if !(10.0..=35.0).contains(&avg_temp_c) {
        return 0.0;
    }
    let logit = SK_B0 + SK_B1 * avg_temp_c + SK_B2 * avg_rh;
    1.0 / (1.0 + (-logit).exp())
}

/// Risk per day; `None` until the trailing window holds five days
pub fn disease_risk_series(days: &[DiseaseDay]) -> Vec<Option<f64>> {
    (0..days.len())
        .map(|i| {
            if i + 1 < DISEASE_WINDOW_DAYS {
                return None;
            }
            let window = &days[i + 1 - DISEASE_WINDOW_DAYS..=i];
            let n = DISEASE_WINDOW_DAYS as f64;
            let avg_temp = window.iter().map(|d| d.mean_temp_c).sum::<f64>() / n;
            let avg_rh = window.iter().map(|d| d.relative_humidity).sum::<f64>() / n;
            Some(smith_kerns_risk(avg_temp, avg_rh))
        })
        .collect()
}

/// Defined risk points for a resolved weather window
pub fn disease_risk_points(window: &[DailyObservation]) -> Vec<DiseaseRiskPoint> {
    let days: Vec<DiseaseDay> = window
        .iter()
        .map(|obs| DiseaseDay {
            mean_temp_c: obs.mean_temp_c(),
            relative_humidity: obs.humidity_or_default(),
        })
        .collect();

    disease_risk_series(&days)
        .into_iter()
        .zip(window)
        .filter_map(|(risk, obs)| {
            risk.map(|risk_score| DiseaseRiskPoint {
                location_id: obs.location_id,
                date: obs.date,
                disease: SMITH_KERNS.to_string(),
                risk_score,
                is_forecast: obs.is_forecast(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_band_temperature() {
        assert_eq!(smith_kerns_risk(9.99, 90.0), 0.0);
        assert_eq!(smith_kerns_risk(35.01, 90.0), 0.0);
        assert!(smith_kerns_risk(25.0, 90.0) > 0.0);
    }

    #[test]
    fn test_known_value() {
        // logit = -11.4041 + 0.1932*25 + 0.0894*80 = 0.578
        let expected = 1.0 / (1.0 + (-0.5779f64).exp());
        assert!((smith_kerns_risk(25.0, 80.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_first_four_points_undefined() {
        let days = vec![
            DiseaseDay {
                mean_temp_c: 22.0,
                relative_humidity: 75.0
            };
            7
        ];
        let series = disease_risk_series(&days);
        assert!(series[..4].iter().all(Option::is_none));
        assert!(series[4..].iter().all(Option::is_some));
    }
}
