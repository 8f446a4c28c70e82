//! Weekly water balance

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::models::{DailyObservation, IrrigationEntry, WaterStatus, WaterWeekSummary};
use crate::types::mm_to_inches;

/// Deficit and status for a period; all amounts share one unit
pub fn water_balance(et0: f64, precipitation: f64, irrigation: f64) -> (f64, WaterStatus) {
    let deficit = et0 - precipitation - irrigation;
    (deficit, water_status(deficit))
}

pub fn water_status(deficit: f64) -> WaterStatus {
    if deficit <= 0.0 {
        WaterStatus::Excellent
    } else if deficit <= 0.5 {
        WaterStatus::Good
    } else if deficit <= 1.0 {
        WaterStatus::Warning
    } else {
        WaterStatus::Critical
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Default)]
struct WeekTotals {
    et0_mm: f64,
    precipitation_mm: f64,
    is_forecast: bool,
}

/// One summary per Monday-Sunday week that has weather, in inches
pub fn weekly_water_summaries(
    lawn_id: Uuid,
    window: &[DailyObservation],
    irrigation: &[IrrigationEntry],
) -> Vec<WaterWeekSummary> {
    let mut weeks: BTreeMap<NaiveDate, WeekTotals> = BTreeMap::new();
    for obs in window {
        let totals = weeks.entry(week_start(obs.date)).or_default();
        totals.et0_mm += obs.et0_mm;
        totals.precipitation_mm += obs.precipitation_mm;
        totals.is_forecast |= obs.is_forecast();
    }

    let mut applied: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in irrigation.iter().filter(|e| e.lawn_id == lawn_id) {
        *applied.entry(week_start(entry.date)).or_default() += entry.amount_in;
    }

    weeks
        .into_iter()
        .map(|(start, totals)| {
            let et0_total = mm_to_inches(totals.et0_mm);
            let precipitation_total = mm_to_inches(totals.precipitation_mm);
            let irrigation_applied = applied.get(&start).copied().unwrap_or(0.0);
            let (water_deficit, status) =
                water_balance(et0_total, precipitation_total, irrigation_applied);
            let iso = start.iso_week();

            WaterWeekSummary {
                lawn_id,
                week_start: start,
                week_end: start + Duration::days(6),
                iso_year: iso.year(),
                iso_week: iso.week(),
                et0_total,
                precipitation_total,
                irrigation_applied,
                water_deficit,
                status,
                is_forecast: totals.is_forecast,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert_eq!(water_status(0.0), WaterStatus::Excellent);
        assert_eq!(water_status(0.5), WaterStatus::Good);
        assert_eq!(water_status(1.0), WaterStatus::Warning);
        assert_eq!(water_status(1.01), WaterStatus::Critical);
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-06-13 is a Thursday
        let thursday = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
        assert_eq!(week_start(thursday), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(week_start(monday), monday);
    }
}
