//! Periodic weather and recalculation cycle
//!
//! One start-up pass after a short delay, then one pass a day at a fixed UTC
//! hour. Locations are processed one after another to bound load on the
//! weather provider; a failing location is recorded and skipped.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use shared::{Location, TaskRecord};
use tokio::task::JoinHandle;

use crate::config::{SchedulerConfig, WeatherConfig};
use crate::error::AppResult;
use crate::services::recalc::{RecalcReport, RecalcService};

const TASK_NAME: &str = "update_location";

/// Outcome of one pass over all locations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Next occurrence of `hour`:00 UTC strictly after `now`
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let hour = hour.min(23);
    let today_run = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);
    if today_run > now {
        today_run
    } else {
        today_run + Duration::days(1)
    }
}

pub struct Scheduler {
    recalc: Arc<RecalcService>,
    config: SchedulerConfig,
    weather: WeatherConfig,
}

impl Scheduler {
    pub fn new(
        recalc: Arc<RecalcService>,
        config: SchedulerConfig,
        weather: WeatherConfig,
    ) -> Self {
        Self {
            recalc,
            config,
            weather,
        }
    }

    /// Run the start-up pass and then the daily loop on a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        tokio::time::sleep(StdDuration::from_secs(self.config.startup_delay_secs)).await;
        tracing::info!("running start-up weather cycle");
        self.run_cycle(self.weather.startup_past_days, Utc::now().date_naive())
            .await;

        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.config.update_hour_utc);
            let wait = (next - now).to_std().unwrap_or(StdDuration::from_secs(60));
            tracing::info!(next_run = %next, "scheduled next weather cycle");
            tokio::time::sleep(wait).await;

            self.run_cycle(self.weather.recurring_past_days, Utc::now().date_naive())
                .await;
        }
    }

    /// Ingest and recalculate every location sequentially
    pub async fn run_cycle(&self, past_days: u32, today: NaiveDate) -> CycleSummary {
        let store = self.recalc.store();
        let locations = match store.list_locations().await {
            Ok(locations) => locations,
            Err(e) => {
                tracing::error!(error = %e, "failed to list locations");
                return CycleSummary::default();
            }
        };

        let mut summary = CycleSummary::default();
        for location in &locations {
            let record = TaskRecord::started(
                format!("{}-{}-{}", TASK_NAME, location.id, today),
                TASK_NAME,
                Some(location.id),
            );
            if let Err(e) = store.record_task(&record).await {
                tracing::warn!(location_id = %location.id, error = %e, "failed to record task start");
            }

            let record = match self.update_location(location, past_days, today).await {
                Ok(report) => {
                    summary.succeeded += 1;
                    let result = format!(
                        "{} weather days, {} gdd models, {} failures",
                        report.weather_days,
                        report.gdd_models,
                        report.failures.len()
                    );
                    record.succeed(result)
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(location_id = %location.id, error = %e, "location update failed");
                    record.fail(e.to_string())
                }
            };
            if let Err(e) = store.record_task(&record).await {
                tracing::warn!(location_id = %location.id, error = %e, "failed to record task outcome");
            }
        }

        tracing::info!(
            locations = locations.len(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            "weather cycle finished"
        );
        summary
    }

    async fn update_location(
        &self,
        location: &Location,
        past_days: u32,
        today: NaiveDate,
    ) -> AppResult<RecalcReport> {
        self.recalc
            .weather()
            .ingest_recent(location, past_days, self.weather.forecast_days, today)
            .await?;
        self.recalc.recalculate_as_of(location.id, today).await
    }
}
