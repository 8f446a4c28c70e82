//! Reset ledger rebuild
//!
//! Threshold and initial entries are derived from a fresh accumulation and
//! replaced wholesale. Manual entries are user commands and always survive;
//! only their run numbers are rewritten.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{GddValue, ResetEvent, ResetType};

/// Dates of every manual entry in `ledger`
pub fn manual_reset_dates(ledger: &[ResetEvent]) -> BTreeSet<NaiveDate> {
    ledger
        .iter()
        .filter(|event| event.reset_type == ResetType::Manual)
        .map(|event| event.date)
        .collect()
}

/// Rebuild a model's ledger from its freshly computed series.
///
/// Emits the initial entry at `start_date`, one threshold entry per run change
/// the series shows on a non-manual date, and every manual date. Entries from
/// `start_date` on are numbered 1, 2, 3, ... in date order, which matches the
/// series run numbers whenever the series starts at `start_date`. Manual dates
/// before `start_date` stay in the ledger with run number 0 and take no part
/// in the accumulation.
pub fn rebuild_ledger(
    model_id: Uuid,
    start_date: NaiveDate,
    series: &[GddValue],
    manual_dates: &BTreeSet<NaiveDate>,
) -> Vec<ResetEvent> {
    let mut entries: Vec<(NaiveDate, ResetType)> = vec![(start_date, ResetType::Initial)];

    entries.extend(manual_dates.iter().map(|date| (*date, ResetType::Manual)));

    entries.extend(
        series
            .windows(2)
            .filter(|pair| pair[1].run != pair[0].run && !manual_dates.contains(&pair[1].date))
            .map(|pair| (pair[1].date, ResetType::Threshold)),
    );

    // Stable sort keeps the initial entry ahead of a manual one on the start date
    entries.sort_by_key(|(date, _)| *date);
    entries.dedup_by_key(|(date, _)| *date);

    let mut run = 0;
    entries
        .into_iter()
        .map(|(date, reset_type)| {
            let run_number = if date < start_date {
                0
            } else {
                run += 1;
                run
            };
            ResetEvent::new(model_id, date, reset_type, run_number)
        })
        .collect()
}
