//! Turfgrass growth potential

use crate::models::{DailyObservation, GrassType, GrowthPotentialPoint};

/// Optimum temperature and spread (°C) of the growth curve, if the grass is known
pub fn curve_params(grass_type: &GrassType) -> Option<(f64, f64)> {
    match grass_type {
        GrassType::CoolSeason => Some((20.0, 5.5)),
        GrassType::WarmSeason => Some((31.0, 7.0)),
        GrassType::Unrecognized(_) => None,
    }
}

/// Gaussian growth potential in [0, 1]; 0 for an unrecognized grass type
pub fn growth_potential(temp_c: f64, grass_type: &GrassType) -> f64 {
    match curve_params(grass_type) {
        Some((t_opt, sigma)) => (-0.5 * ((temp_c - t_opt) / sigma).powi(2)).exp(),
        None => 0.0,
    }
}

/// Trailing mean over `window` values; `None` until the window is full
pub fn rolling_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Growth potential with 3/5/7-day trailing averages for a resolved window
pub fn growth_potential_points(
    window: &[DailyObservation],
    grass_type: &GrassType,
) -> Vec<GrowthPotentialPoint> {
    let values: Vec<f64> = window
        .iter()
        .map(|obs| growth_potential(obs.mean_temp_c(), grass_type))
        .collect();
    let avg3 = rolling_average(&values, 3);
    let avg5 = rolling_average(&values, 5);
    let avg7 = rolling_average(&values, 7);

    window
        .iter()
        .enumerate()
        .map(|(i, obs)| GrowthPotentialPoint {
            location_id: obs.location_id,
            date: obs.date,
            growth_potential: values[i],
            gp_3d_avg: avg3[i],
            gp_5d_avg: avg5[i],
            gp_7d_avg: avg7[i],
            is_forecast: obs.is_forecast(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_at_optimum() {
        assert_eq!(growth_potential(20.0, &GrassType::CoolSeason), 1.0);
        assert_eq!(growth_potential(31.0, &GrassType::WarmSeason), 1.0);
    }

    #[test]
    fn test_unrecognized_grass() {
        let grass = GrassType::from("zoysia_hybrid");
        assert_eq!(growth_potential(20.0, &grass), 0.0);
    }

    #[test]
    fn test_rolling_average_window() {
        let avg = rolling_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(avg, vec![None, None, Some(2.0), Some(3.0)]);
        assert!(rolling_average(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }
}
