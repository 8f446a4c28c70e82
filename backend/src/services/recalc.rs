//! Recalculation orchestrator
//!
//! Regenerates every derived series of a location from stored weather, model
//! configuration and the reset ledger. Each series is written through a
//! replace over its key range, so running the same recalculation twice leaves
//! identical rows behind. A failing calculator is logged and recorded in the
//! report without stopping the others.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use shared::calc::{disease, gdd, growth, ledger, water, weed};
use shared::{
    resolve_observations, DailyObservation, DateRange, GddModelConfig, GrassType, Lawn, Location,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::weather::WeatherService;
use crate::store::Store;

/// Extra days loaded ahead of the series start so rolling windows are full
const WARMUP_DAYS: i64 = 6;

/// Window sizes used by a recalculation
#[derive(Debug, Clone, Copy)]
pub struct RecalcSettings {
    /// Days of history the location-level series are rewritten over
    pub lookback_days: u32,
    pub forecast_days: u32,
}

/// What a location recalculation produced
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RecalcReport {
    pub location_id: Uuid,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub weather_days: usize,
    pub gdd_models: usize,
    pub gdd_values: usize,
    pub disease_points: usize,
    pub growth_points: usize,
    pub weed_points: usize,
    pub water_weeks: usize,
    /// One entry per calculator that did not complete
    pub failures: Vec<String>,
}

/// Date bounds of a location recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalcWindow {
    /// First day whose derived rows are rewritten
    pub series_start: NaiveDate,
    /// First day loaded for rolling windows
    pub warmup_start: NaiveDate,
    /// First day of the weed GDD year
    pub weed_start: NaiveDate,
    /// Monday of the first rewritten water week
    pub water_start: NaiveDate,
    /// Earliest weather any calculator needs
    pub required_start: NaiveDate,
    pub end: NaiveDate,
}

impl RecalcWindow {
    pub fn new(settings: RecalcSettings, today: NaiveDate, models: &[GddModelConfig]) -> Self {
        let series_start = today - Duration::days(settings.lookback_days as i64);
        let warmup_start = series_start - Duration::days(WARMUP_DAYS);
        let weed_start =
            NaiveDate::from_ymd_opt(series_start.year(), 1, 1).unwrap_or(series_start);
        let water_start = water::week_start(series_start);
        let required_start = models
            .iter()
            .map(|m| m.start_date)
            .chain([warmup_start, weed_start, water_start])
            .min()
            .unwrap_or(warmup_start);

        Self {
            series_start,
            warmup_start,
            weed_start,
            water_start,
            required_start,
            end: today + Duration::days(settings.forecast_days as i64),
        }
    }
}

fn since(window: &[DailyObservation], from: NaiveDate) -> Vec<DailyObservation> {
    window.iter().filter(|obs| obs.date >= from).cloned().collect()
}

/// Recalculation orchestrator
#[derive(Clone)]
pub struct RecalcService {
    store: Arc<dyn Store>,
    weather: WeatherService,
    settings: RecalcSettings,
}

impl RecalcService {
    pub fn new(store: Arc<dyn Store>, weather: WeatherService, settings: RecalcSettings) -> Self {
        Self {
            store,
            weather,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn weather(&self) -> &WeatherService {
        &self.weather
    }

    /// Regenerate every derived series of a location
    pub async fn recalculate(&self, location_id: Uuid) -> AppResult<RecalcReport> {
        self.recalculate_as_of(location_id, Utc::now().date_naive())
            .await
    }

    pub async fn recalculate_as_of(
        &self,
        location_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<RecalcReport> {
        let location = self.location(location_id).await?;
        let models = self.store.list_gdd_models(location_id).await?;
        let bounds = RecalcWindow::new(self.settings, today, &models);

        // A weather failure aborts this location only
        self.weather
            .ensure_history(&location, bounds.required_start, today)
            .await?;

        let raw = self
            .store
            .load_weather(location_id, DateRange::new(bounds.required_start, bounds.end))
            .await?;
        let window = resolve_observations(raw);

        let mut report = RecalcReport {
            location_id,
            window_start: window.first().map(|obs| obs.date),
            window_end: window.last().map(|obs| obs.date),
            weather_days: window.len(),
            ..Default::default()
        };

        for model in &models {
            match self.recompute_model(model, &window).await {
                Ok(values) => {
                    report.gdd_models += 1;
                    report.gdd_values += values;
                }
                Err(e) => {
                    tracing::warn!(
                        location_id = %location_id,
                        model_id = %model.id,
                        error = %e,
                        "GDD recompute failed"
                    );
                    report.failures.push(format!("gdd model {}: {}", model.id, e));
                }
            }
        }

        match self.recompute_disease(location_id, &window, &bounds).await {
            Ok(n) => report.disease_points = n,
            Err(e) => {
                tracing::warn!(location_id = %location_id, error = %e, "disease risk failed");
                report.failures.push(format!("disease risk: {}", e));
            }
        }

        let grass = match self.store.list_lawns(location_id).await {
            Ok(lawns) => {
                report.water_weeks = self
                    .recompute_water(&lawns, &window, &bounds, &mut report.failures)
                    .await;
                lawns.into_iter().next().map(|lawn| lawn.grass_type)
            }
            Err(e) => {
                tracing::warn!(location_id = %location_id, error = %e, "failed to load lawns");
                report.failures.push(format!("lawns: {}", e));
                None
            }
        };

        match &grass {
            Some(grass_type) => {
                match self
                    .recompute_growth(location_id, &window, &bounds, grass_type)
                    .await
                {
                    Ok(n) => report.growth_points = n,
                    Err(e) => {
                        tracing::warn!(location_id = %location_id, error = %e, "growth potential failed");
                        report.failures.push(format!("growth potential: {}", e));
                    }
                }
            }
            None => {
                tracing::info!(
                    location_id = %location_id,
                    "no lawn configured, skipping growth potential"
                );
                report
                    .failures
                    .push("growth potential: no lawn configured".to_string());
            }
        }

        let weed_grass = grass.unwrap_or(GrassType::CoolSeason);
        match self
            .recompute_weed(location_id, &window, &bounds, &weed_grass)
            .await
        {
            Ok(n) => report.weed_points = n,
            Err(e) => {
                tracing::warn!(location_id = %location_id, error = %e, "weed pressure failed");
                report.failures.push(format!("weed pressure: {}", e));
            }
        }

        tracing::info!(
            location_id = %location_id,
            weather_days = report.weather_days,
            gdd_models = report.gdd_models,
            failures = report.failures.len(),
            "location recalculated"
        );
        Ok(report)
    }

    /// Regenerate one model's values and ledger
    pub async fn recalculate_gdd_model(&self, model_id: Uuid) -> AppResult<usize> {
        self.recalculate_gdd_model_as_of(model_id, Utc::now().date_naive())
            .await
    }

    pub async fn recalculate_gdd_model_as_of(
        &self,
        model_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<usize> {
        let model = self
            .store
            .get_gdd_model(model_id)
            .await?
            .ok_or_else(|| AppError::NotFound("GDD model".to_string()))?;
        let location = self.location(model.location_id).await?;

        self.weather
            .ensure_history(&location, model.start_date, today)
            .await?;

        let end = today + Duration::days(self.settings.forecast_days as i64);
        let raw = self
            .store
            .load_weather(location.id, DateRange::new(model.start_date, end))
            .await?;
        let window = resolve_observations(raw);

        self.recompute_model(&model, &window).await
    }

    async fn location(&self, location_id: Uuid) -> AppResult<Location> {
        self.store
            .get_location(location_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    async fn recompute_model(
        &self,
        model: &GddModelConfig,
        window: &[DailyObservation],
    ) -> AppResult<usize> {
        let stored = self.store.list_resets(model.id).await?;
        let manual = ledger::manual_reset_dates(&stored);
        let values = gdd::compute_model_values(model, window, &manual);
        let rebuilt = ledger::rebuild_ledger(model.id, model.start_date, &values, &manual);

        self.store
            .replace_gdd_output(model.id, &values, &rebuilt)
            .await?;

        tracing::debug!(
            model_id = %model.id,
            values = values.len(),
            resets = rebuilt.len(),
            "GDD model recomputed"
        );
        Ok(values.len())
    }

    async fn recompute_disease(
        &self,
        location_id: Uuid,
        window: &[DailyObservation],
        bounds: &RecalcWindow,
    ) -> AppResult<usize> {
        let points: Vec<_> = disease::disease_risk_points(&since(window, bounds.warmup_start))
            .into_iter()
            .filter(|p| p.date >= bounds.series_start)
            .collect();
        self.store
            .replace_disease_risk(location_id, bounds.series_start, &points)
            .await?;
        Ok(points.len())
    }

    async fn recompute_growth(
        &self,
        location_id: Uuid,
        window: &[DailyObservation],
        bounds: &RecalcWindow,
        grass_type: &GrassType,
    ) -> AppResult<usize> {
        let points: Vec<_> =
            growth::growth_potential_points(&since(window, bounds.warmup_start), grass_type)
                .into_iter()
                .filter(|p| p.date >= bounds.series_start)
                .collect();
        self.store
            .replace_growth_potential(location_id, bounds.series_start, &points)
            .await?;
        Ok(points.len())
    }

    async fn recompute_weed(
        &self,
        location_id: Uuid,
        window: &[DailyObservation],
        bounds: &RecalcWindow,
        grass_type: &GrassType,
    ) -> AppResult<usize> {
        let species = self.store.list_active_weed_species().await?;
        let weed_window = since(window, bounds.weed_start.min(bounds.warmup_start));

        let mut points = Vec::new();
        for s in &species {
            let series = weed::weed_pressure_points(&weed_window, s, grass_type);
            points.extend(series.into_iter().filter(|p| p.date >= bounds.series_start));
        }

        self.store
            .replace_weed_pressure(location_id, bounds.series_start, &points)
            .await?;
        Ok(points.len())
    }

    /// Each lawn is written on its own; a failing lawn is logged and listed in `failures`
    async fn recompute_water(
        &self,
        lawns: &[Lawn],
        window: &[DailyObservation],
        bounds: &RecalcWindow,
        failures: &mut Vec<String>,
    ) -> usize {
        let water_window = since(window, bounds.water_start);
        let mut weeks = 0;

        for lawn in lawns.iter().filter(|lawn| lawn.weather_enabled) {
            match self.recompute_lawn_water(lawn, &water_window, bounds).await {
                Ok(n) => weeks += n,
                Err(e) => {
                    tracing::warn!(lawn_id = %lawn.id, error = %e, "water balance failed");
                    failures.push(format!("water balance {}: {}", lawn.id, e));
                }
            }
        }

        weeks
    }

    async fn recompute_lawn_water(
        &self,
        lawn: &Lawn,
        water_window: &[DailyObservation],
        bounds: &RecalcWindow,
    ) -> AppResult<usize> {
        let irrigation = self
            .store
            .list_irrigation(lawn.id, DateRange::new(bounds.water_start, bounds.end))
            .await?;
        let summaries = water::weekly_water_summaries(lawn.id, water_window, &irrigation);
        self.store
            .replace_water_summaries(lawn.id, bounds.water_start, &summaries)
            .await?;
        Ok(summaries.len())
    }
}
