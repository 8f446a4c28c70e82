//! Tests for GDD accumulation and the reset ledger
//! Verifies run numbering, reset placement and determinism

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use shared::calc::gdd::{compute_model_values, compute_series, daily_gdd, GddDay};
use shared::calc::ledger::{manual_reset_dates, rebuild_ledger};
use shared::{
    DailyObservation, GddModelConfig, ObservationKind, ResetEvent, ResetType, TemperatureUnit,
};
use uuid::Uuid;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn day(n: i64) -> NaiveDate {
    start() + Duration::days(n)
}

fn flat_days(n: usize, tmax: f64, tmin: f64) -> Vec<GddDay> {
    (0..n)
        .map(|i| GddDay {
            date: day(i as i64),
            tmax,
            tmin,
        })
        .collect()
}

fn observation(location_id: Uuid, date: NaiveDate, tmax: f64, tmin: f64) -> DailyObservation {
    DailyObservation {
        date,
        location_id,
        kind: ObservationKind::Historical,
        temp_max_c: tmax,
        temp_min_c: tmin,
        precipitation_mm: 0.0,
        precipitation_probability_max: 0.0,
        wind_speed_max_ms: 0.0,
        wind_gusts_max_ms: 0.0,
        wind_direction_dominant_deg: 0.0,
        et0_mm: 0.0,
        relative_humidity_mean: None,
        relative_humidity_max: None,
        relative_humidity_min: None,
        dew_point_max_c: None,
        dew_point_min_c: None,
        dew_point_mean_c: None,
        sunshine_duration_s: None,
    }
}

fn model(unit: TemperatureUnit, base: f64, threshold: f64, reset: bool) -> GddModelConfig {
    GddModelConfig {
        id: Uuid::new_v4(),
        location_id: Uuid::new_v4(),
        name: "Crabgrass".to_string(),
        base_temperature: base,
        unit,
        start_date: start(),
        threshold,
        reset_on_threshold: reset,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Accumulation Scenarios
// =============================================================================

mod accumulation {
    use super::*;

    #[test]
    fn ten_warm_days_in_celsius() {
        let points = compute_series(&flat_days(10, 30.0, 20.0), 10.0, 0.0, false, &BTreeSet::new());

        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p.daily_gdd == 15.0 && p.run == 1));
        assert_eq!(points[9].cumulative_gdd, 150.0);
    }

    #[test]
    fn fahrenheit_model_scales_by_nine_fifths() {
        let celsius = model(TemperatureUnit::C, 10.0, 0.0, false);
        let fahrenheit = GddModelConfig {
            unit: TemperatureUnit::F,
            base_temperature: 50.0,
            ..celsius.clone()
        };
        let window: Vec<_> = (0..10)
            .map(|i| observation(celsius.location_id, day(i), 30.0, 20.0))
            .collect();

        let c_values = compute_model_values(&celsius, &window, &BTreeSet::new());
        let f_values = compute_model_values(&fahrenheit, &window, &BTreeSet::new());

        assert_eq!(f_values[0].daily_gdd, 27.0);
        assert_eq!(f_values[9].cumulative_gdd, 270.0);
        for (c, f) in c_values.iter().zip(&f_values) {
            assert!((f.cumulative_gdd - c.cumulative_gdd * 1.8).abs() < 1e-9);
        }
    }

    #[test]
    fn threshold_reset_lands_on_the_following_day() {
        // 27 per day crosses 200 on day 8 (216); day 9 opens run 2
        let days: Vec<_> = (0..10)
            .map(|i| GddDay {
                date: day(i),
                tmax: 86.0,
                tmin: 68.0,
            })
            .collect();
        let points = compute_series(&days, 50.0, 200.0, true, &BTreeSet::new());

        assert_eq!(points[7].cumulative_gdd, 216.0);
        assert_eq!(points[7].run, 1);
        assert_eq!(points[8].cumulative_gdd, 27.0);
        assert_eq!(points[8].run, 2);
        assert_eq!(points[9].cumulative_gdd, 54.0);
    }

    #[test]
    fn threshold_ignored_when_flag_off() {
        let points = compute_series(&flat_days(20, 30.0, 20.0), 10.0, 50.0, false, &BTreeSet::new());
        assert!(points.iter().all(|p| p.run == 1));
        assert_eq!(points[19].cumulative_gdd, 300.0);
    }

    #[test]
    fn manual_reset_restarts_on_its_own_day() {
        let manual: BTreeSet<_> = [day(4)].into_iter().collect();
        let points = compute_series(&flat_days(7, 30.0, 20.0), 10.0, 0.0, false, &manual);

        assert_eq!(points[3].cumulative_gdd, 60.0);
        assert_eq!(points[4].cumulative_gdd, 15.0);
        assert_eq!(points[4].run, 2);
        assert_eq!(points[6].cumulative_gdd, 45.0);
    }

    #[test]
    fn manual_and_pending_threshold_on_same_day_count_once() {
        // Threshold 30 is reached on day 1, so day 2 is pending and also manual
        let manual: BTreeSet<_> = [day(2)].into_iter().collect();
        let points = compute_series(&flat_days(4, 30.0, 20.0), 10.0, 30.0, true, &manual);

        assert_eq!(points[2].run, 2);
        assert_eq!(points[2].cumulative_gdd, 15.0);
        assert_eq!(points[3].run, 2);
    }

    #[test]
    fn cold_days_contribute_nothing() {
        assert_eq!(daily_gdd(8.0, 2.0, 10.0), 0.0);
        let points = compute_series(&flat_days(5, 8.0, 2.0), 10.0, 0.0, false, &BTreeSet::new());
        assert!(points.iter().all(|p| p.cumulative_gdd == 0.0));
    }

    #[test]
    fn values_before_model_start_are_ignored() {
        let config = model(TemperatureUnit::C, 10.0, 0.0, false);
        let window: Vec<_> = (-3..5)
            .map(|i| observation(config.location_id, day(i), 30.0, 20.0))
            .collect();

        let values = compute_model_values(&config, &window, &BTreeSet::new());
        assert_eq!(values.len(), 5);
        assert_eq!(values[0].date, start());
        assert_eq!(values[0].cumulative_gdd, 15.0);
    }

    #[test]
    fn forecast_flag_follows_observation_kind() {
        let config = model(TemperatureUnit::C, 10.0, 0.0, false);
        let mut window: Vec<_> = (0..3)
            .map(|i| observation(config.location_id, day(i), 30.0, 20.0))
            .collect();
        window[2].kind = ObservationKind::Forecast;

        let values = compute_model_values(&config, &window, &BTreeSet::new());
        assert_eq!(
            values.iter().map(|v| v.is_forecast).collect::<Vec<_>>(),
            vec![false, false, true]
        );
    }
}

// =============================================================================
// Reset Ledger Tests
// =============================================================================

mod ledger {
    use super::*;

    #[test]
    fn threshold_model_ledger_matches_series_runs() {
        let config = model(TemperatureUnit::C, 10.0, 40.0, true);
        let window: Vec<_> = (0..12)
            .map(|i| observation(config.location_id, day(i), 30.0, 20.0))
            .collect();
        let values = compute_model_values(&config, &window, &BTreeSet::new());
        let ledger = rebuild_ledger(config.id, config.start_date, &values, &BTreeSet::new());

        // 15/day reaches 45 on day 2, so runs open on days 0, 3, 6, 9
        let summary: Vec<_> = ledger
            .iter()
            .map(|e| (e.date, e.reset_type, e.run_number))
            .collect();
        assert_eq!(
            summary,
            vec![
                (day(0), ResetType::Initial, 1),
                (day(3), ResetType::Threshold, 2),
                (day(6), ResetType::Threshold, 3),
                (day(9), ResetType::Threshold, 4),
            ]
        );
        for event in &ledger {
            let value = values.iter().find(|v| v.date == event.date).unwrap();
            assert_eq!(value.run, event.run_number);
        }
    }

    #[test]
    fn manual_entries_survive_rebuild() {
        let config = model(TemperatureUnit::C, 10.0, 0.0, false);
        let stored = vec![
            ResetEvent::new(config.id, start(), ResetType::Initial, 1),
            ResetEvent::new(config.id, day(5), ResetType::Manual, 0),
            ResetEvent::new(config.id, day(2), ResetType::Threshold, 2),
        ];
        let manual = manual_reset_dates(&stored);
        assert_eq!(manual, [day(5)].into_iter().collect());

        let window: Vec<_> = (0..8)
            .map(|i| observation(config.location_id, day(i), 30.0, 20.0))
            .collect();
        let values = compute_model_values(&config, &window, &manual);
        let ledger = rebuild_ledger(config.id, config.start_date, &values, &manual);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].reset_type, ResetType::Manual);
        assert_eq!(ledger[1].run_number, 2);
        assert_eq!(ledger[1].id, ResetEvent::event_id(config.id, day(5)));
    }

    #[test]
    fn manual_dates_before_start_stay_inactive() {
        let config = model(TemperatureUnit::C, 10.0, 0.0, false);
        let earlier = start() - Duration::days(3);
        let manual: BTreeSet<_> = [earlier, day(4)].into_iter().collect();

        let window: Vec<_> = (0..6)
            .map(|i| observation(config.location_id, day(i), 30.0, 20.0))
            .collect();
        let values = compute_model_values(&config, &window, &manual);
        let ledger = rebuild_ledger(config.id, config.start_date, &values, &manual);

        let summary: Vec<_> = ledger
            .iter()
            .map(|e| (e.date, e.reset_type, e.run_number))
            .collect();
        assert_eq!(
            summary,
            vec![
                (earlier, ResetType::Manual, 0),
                (start(), ResetType::Initial, 1),
                (day(4), ResetType::Manual, 2),
            ]
        );
        assert_eq!(values.iter().map(|v| v.run).max(), Some(2));
    }

    #[test]
    fn manual_date_on_start_is_covered_by_initial_entry() {
        let model_id = Uuid::new_v4();
        let manual: BTreeSet<_> = [start()].into_iter().collect();
        let ledger = rebuild_ledger(model_id, start(), &[], &manual);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].reset_type, ResetType::Initial);
        assert_eq!(ledger[0].run_number, 1);
    }

    #[test]
    fn event_ids_are_stable_per_model_and_date() {
        let model_id = Uuid::new_v4();
        assert_eq!(
            ResetEvent::event_id(model_id, day(3)),
            ResetEvent::event_id(model_id, day(3))
        );
        assert_ne!(
            ResetEvent::event_id(model_id, day(3)),
            ResetEvent::event_id(model_id, day(4))
        );
    }
}

// =============================================================================
// Accumulator Properties
// =============================================================================

fn temperature_pairs(len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-10.0f64..40.0, 0.0f64..15.0), 1..len)
        .prop_map(|pairs| pairs.into_iter().map(|(tmax, spread)| (tmax, tmax - spread)).collect())
}

fn to_days(pairs: &[(f64, f64)]) -> Vec<GddDay> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (tmax, tmin))| GddDay {
            date: day(i as i64),
            tmax: *tmax,
            tmin: *tmin,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Daily contribution is never negative
    #[test]
    fn property_1_daily_gdd_non_negative(
        tmax in -40.0f64..50.0,
        tmin in -40.0f64..50.0,
        base in -5.0f64..60.0,
    ) {
        prop_assert!(daily_gdd(tmax, tmin, base) >= 0.0);
    }

    /// Property 2: Without resets the cumulative value is the running sum
    #[test]
    fn property_2_cumulative_is_running_sum(pairs in temperature_pairs(60), base in 0.0f64..15.0) {
        let points = compute_series(&to_days(&pairs), base, 0.0, false, &BTreeSet::new());
        let mut sum = 0.0;
        for point in &points {
            sum += point.daily_gdd;
            prop_assert!((point.cumulative_gdd - sum).abs() < 1e-9);
            prop_assert_eq!(point.run, 1);
        }
    }

    /// Property 3: A manual reset restarts the total and advances the run by one
    #[test]
    fn property_3_manual_reset_restarts_run(
        pairs in temperature_pairs(40),
        offset in 1usize..40,
    ) {
        prop_assume!(offset < pairs.len());
        let days = to_days(&pairs);
        let manual: BTreeSet<_> = [days[offset].date].into_iter().collect();
        let points = compute_series(&days, 10.0, 0.0, false, &manual);

        prop_assert_eq!(points[offset].cumulative_gdd, points[offset].daily_gdd);
        prop_assert_eq!(points[offset].run, points[offset - 1].run + 1);
    }

    /// Property 4: A threshold crossing resets the next day, never the same day
    #[test]
    fn property_4_threshold_reset_is_next_day(
        pairs in temperature_pairs(60),
        threshold in 10.0f64..120.0,
    ) {
        let points = compute_series(&to_days(&pairs), 5.0, threshold, true, &BTreeSet::new());
        for i in 1..points.len() {
            let (prev, cur) = (&points[i - 1], &points[i]);
            // Reset days carry only their own contribution and never arm a reset
            let prev_is_reset_day = i >= 2 && points[i - 2].run != prev.run;
            if cur.run != prev.run {
                prop_assert!(prev.cumulative_gdd >= threshold);
                prop_assert_eq!(cur.cumulative_gdd, cur.daily_gdd);
                prop_assert_eq!(cur.run, prev.run + 1);
            } else if !prev_is_reset_day {
                prop_assert!(prev.cumulative_gdd < threshold);
            }
        }
    }

    /// Property 5: Accumulation is deterministic
    #[test]
    fn property_5_accumulation_is_deterministic(
        pairs in temperature_pairs(40),
        threshold in 0.0f64..100.0,
        reset in any::<bool>(),
    ) {
        let days = to_days(&pairs);
        let manual: BTreeSet<_> = days.iter().step_by(7).skip(1).map(|d| d.date).collect();
        let first = compute_series(&days, 10.0, threshold, reset, &manual);
        let second = compute_series(&days, 10.0, threshold, reset, &manual);
        prop_assert_eq!(first, second);
    }

    /// Property 6: Ledger run numbers agree with the series on every reset date
    /// from the start on; earlier manual dates are kept with run number 0
    #[test]
    fn property_6_ledger_agrees_with_series(
        pairs in temperature_pairs(60),
        threshold in 20.0f64..150.0,
        manual_offsets in prop::collection::btree_set(-10i64..60, 0..4),
    ) {
        let config = model(TemperatureUnit::C, 5.0, threshold, true);
        let window: Vec<_> = pairs
            .iter()
            .enumerate()
            .map(|(i, (tmax, tmin))| observation(config.location_id, day(i as i64), *tmax, *tmin))
            .collect();
        let manual: BTreeSet<_> = manual_offsets
            .into_iter()
            .filter(|offset| *offset < pairs.len() as i64)
            .map(day)
            .collect();

        let values = compute_model_values(&config, &window, &manual);
        let ledger = rebuild_ledger(config.id, config.start_date, &values, &manual);

        let (inactive, active): (Vec<_>, Vec<_>) =
            ledger.iter().partition(|event| event.date < config.start_date);
        prop_assert!(inactive
            .iter()
            .all(|e| e.reset_type == ResetType::Manual && e.run_number == 0));
        prop_assert_eq!(active[0].reset_type, ResetType::Initial);
        for (i, event) in active.iter().enumerate() {
            prop_assert_eq!(event.run_number, i as i32 + 1);
            let value = values.iter().find(|v| v.date == event.date);
            prop_assert!(value.is_some());
            prop_assert_eq!(value.map(|v| v.run), Some(event.run_number));
        }
    }
}
