//! Growing degree day accumulation
//!
//! The accumulator walks an ordered, gap-free weather window and carries
//! `(cumulative, run, pending_reset)` from one day to the next. Runs end either
//! on a manual reset date or on the day after the cumulative total reaches the
//! model threshold.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyObservation, GddModelConfig, GddValue};

/// One day of temperatures, already expressed in the model's unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GddDay {
    pub date: NaiveDate,
    pub tmax: f64,
    pub tmin: f64,
}

/// One day of accumulator output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GddPoint {
    pub date: NaiveDate,
    pub daily_gdd: f64,
    pub cumulative_gdd: f64,
    pub run: i32,
}

/// Degree days contributed by a single day. Never negative.
pub fn daily_gdd(tmax: f64, tmin: f64, base_temp: f64) -> f64 {
    ((tmax + tmin) / 2.0 - base_temp).max(0.0)
}

/// Whether a model's settings allow threshold-triggered resets at all
pub fn threshold_resets_enabled(threshold: f64, reset_on_threshold: bool) -> bool {
    reset_on_threshold && threshold > 0.0
}

/// Accumulate degree days over `days`.
///
/// `days` must be sorted ascending, contiguous and free of duplicates. The
/// first day always opens run 1. On a reset day the cumulative value equals
/// that day's own contribution.
pub fn compute_series(
    days: &[GddDay],
    base_temp: f64,
    threshold: f64,
    reset_on_threshold: bool,
    manual_reset_dates: &BTreeSet<NaiveDate>,
) -> Vec<GddPoint> {
    let threshold_enabled = threshold_resets_enabled(threshold, reset_on_threshold);
    let mut points = Vec::with_capacity(days.len());
    let mut cumulative = 0.0;
    let mut run = 1;
    let mut pending_reset = false;

    for (i, day) in days.iter().enumerate() {
        let daily = daily_gdd(day.tmax, day.tmin, base_temp);
        let manual = i > 0 && manual_reset_dates.contains(&day.date);

        if manual || pending_reset {
            // A manual reset and a pending threshold reset on the same day count once
            run += 1;
            cumulative = daily;
            pending_reset = false;
        } else {
            cumulative += daily;
            if threshold_enabled && cumulative >= threshold {
                pending_reset = true;
            }
        }

        points.push(GddPoint {
            date: day.date,
            daily_gdd: daily,
            cumulative_gdd: cumulative,
            run,
        });
    }

    points
}

/// Weather days on or after the model start, converted into the model's unit
pub fn model_days(model: &GddModelConfig, window: &[DailyObservation]) -> Vec<GddDay> {
    window
        .iter()
        .filter(|obs| obs.date >= model.start_date)
        .map(|obs| GddDay {
            date: obs.date,
            tmax: model.unit.from_celsius(obs.temp_max_c),
            tmin: model.unit.from_celsius(obs.temp_min_c),
        })
        .collect()
}

/// Full `GddValue` series for a model over a resolved weather window
pub fn compute_model_values(
    model: &GddModelConfig,
    window: &[DailyObservation],
    manual_reset_dates: &BTreeSet<NaiveDate>,
) -> Vec<GddValue> {
    let in_range: Vec<&DailyObservation> = window
        .iter()
        .filter(|obs| obs.date >= model.start_date)
        .collect();
    let days = model_days(model, window);
    let points = compute_series(
        &days,
        model.base_temperature,
        model.threshold,
        model.reset_on_threshold,
        manual_reset_dates,
    );

    points
        .into_iter()
        .zip(in_range)
        .map(|(point, obs)| GddValue {
            model_id: model.id,
            date: point.date,
            daily_gdd: point.daily_gdd,
            cumulative_gdd: point.cumulative_gdd,
            run: point.run,
            is_forecast: obs.is_forecast(),
        })
        .collect()
}
