//! Fixtures shared by the backend integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    DailyObservation, DateRange, DiseaseRiskPoint, GddModelConfig, GddValue, GpsCoordinates,
    GrassType, GrowthPotentialPoint, IrrigationEntry, Lawn, Location, ResetEvent, ResetType,
    TaskRecord, TemperatureUnit, WaterWeekSummary, WeedPressurePoint, WeedSeason, WeedSpecies,
};
use tokio::sync::Semaphore;
use turf_backend::error::{AppError, AppResult};
use turf_backend::external::{WeatherDay, WeatherSource};
use turf_backend::services::{RecalcService, RecalcSettings, WeatherService};
use turf_backend::store::{MemoryStore, Store};
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fixed "today" used by the `*_as_of` entry points
pub fn today() -> NaiveDate {
    date(2024, 6, 15)
}

pub fn settings() -> RecalcSettings {
    RecalcSettings {
        lookback_days: 30,
        forecast_days: 5,
    }
}

/// Deterministic weather for a date
pub fn weather_day(date: NaiveDate) -> WeatherDay {
    let wobble = (date.ordinal() % 7) as f64;
    WeatherDay {
        date,
        temp_max_c: 24.0 + wobble,
        temp_min_c: 13.0 + wobble / 2.0,
        precipitation_mm: if date.ordinal() % 5 == 0 { 9.0 } else { 0.0 },
        precipitation_probability_max: 20.0,
        wind_speed_max_ms: 4.0,
        wind_gusts_max_ms: 9.0,
        wind_direction_dominant_deg: 220.0,
        et0_mm: 4.5,
        relative_humidity_mean: Some(65.0 + wobble * 3.0),
        relative_humidity_max: Some(90.0),
        relative_humidity_min: Some(45.0),
        dew_point_max_c: Some(16.0),
        dew_point_min_c: Some(9.0),
        dew_point_mean_c: Some(12.5),
        sunshine_duration_s: Some(36000.0),
    }
}

fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<WeatherDay> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(weather_day(current));
        current = current + Duration::days(1);
    }
    days
}

/// In-process weather provider with call recording, failure switch and an optional gate
pub struct FakeWeather {
    today: NaiveDate,
    failing: AtomicBool,
    gate: Option<Arc<Semaphore>>,
    historical_calls: Mutex<Vec<DateRange>>,
}

impl FakeWeather {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            failing: AtomicBool::new(false),
            gate: None,
            historical_calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests wait for a permit from `gate` before answering
    pub fn gated(today: NaiveDate, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(today)
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn historical_calls(&self) -> Vec<DateRange> {
        self.historical_calls.lock().unwrap().clone()
    }

    async fn check(&self) -> AppResult<()> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?
                .forget();
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::WeatherStatus {
                status: 503,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch_recent(
        &self,
        _coordinates: &GpsCoordinates,
        past_days: u32,
        forecast_days: u32,
    ) -> AppResult<Vec<WeatherDay>> {
        self.check().await?;
        Ok(days_between(
            self.today - Duration::days(past_days as i64),
            self.today + Duration::days(forecast_days as i64),
        ))
    }

    async fn fetch_historical(
        &self,
        _coordinates: &GpsCoordinates,
        range: DateRange,
    ) -> AppResult<Vec<WeatherDay>> {
        self.historical_calls.lock().unwrap().push(range);
        self.check().await?;
        Ok(days_between(range.start, range.end))
    }
}

pub fn location(name: &str) -> Location {
    Location {
        id: Uuid::new_v4(),
        name: name.to_string(),
        coordinates: GpsCoordinates::new(Decimal::new(3990, 2), Decimal::new(-8300, 2)),
    }
}

pub fn lawn(location_id: Uuid, grass_type: GrassType) -> Lawn {
    Lawn {
        id: Uuid::new_v4(),
        location_id,
        name: "Front yard".to_string(),
        grass_type,
        weather_enabled: true,
    }
}

pub fn crabgrass() -> WeedSpecies {
    WeedSpecies {
        id: Uuid::new_v4(),
        name: "Digitaria sanguinalis".to_string(),
        common_name: "Crabgrass".to_string(),
        gdd_base_temp_c: 10.0,
        gdd_threshold_emergence: 150.0,
        optimal_soil_temp_min_c: 13.0,
        optimal_soil_temp_max_c: 18.0,
        season: WeedSeason::Spring,
        is_active: true,
    }
}

pub fn gdd_model(location_id: Uuid, start_date: NaiveDate, threshold: f64) -> GddModelConfig {
    GddModelConfig {
        id: Uuid::new_v4(),
        location_id,
        name: "Crabgrass preventer".to_string(),
        base_temperature: 50.0,
        unit: TemperatureUnit::F,
        start_date,
        threshold,
        reset_on_threshold: threshold > 0.0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Store, weather fake and orchestrator wired together around one location
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub weather: Arc<FakeWeather>,
    pub recalc: Arc<RecalcService>,
    pub location: Location,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_weather(FakeWeather::new(today()))
    }

    pub fn with_weather(weather: FakeWeather) -> Self {
        Self::build(weather, |store| store as Arc<dyn Store>)
    }

    /// Orchestrator writes go through a store that refuses `fault`;
    /// `store` still exposes every row that did get written
    pub fn with_fault(fault: Fault) -> Self {
        Self::build(FakeWeather::new(today()), move |store| {
            Arc::new(FaultyStore::new(store, fault)) as Arc<dyn Store>
        })
    }

    fn build(
        weather: FakeWeather,
        wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn Store>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let weather = Arc::new(weather);
        let location = location("Test Lawn Site");
        store.add_location(location.clone());
        store.add_weed_species(crabgrass());

        let dyn_store = wrap(Arc::clone(&store));
        let source: Arc<dyn WeatherSource> = weather.clone();
        let recalc = Arc::new(RecalcService::new(
            Arc::clone(&dyn_store),
            WeatherService::new(dyn_store, source),
            settings(),
        ));

        Self {
            store,
            weather,
            recalc,
            location,
        }
    }

    pub fn dyn_store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// Store a model together with its initial ledger entry
    pub async fn add_model(&self, model: &GddModelConfig) {
        self.store.insert_gdd_model(model).await.unwrap();
        self.store
            .put_reset(&ResetEvent::new(model.id, model.start_date, ResetType::Initial, 1))
            .await
            .unwrap();
    }
}

/// Replace-write refused by a `FaultyStore`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    DiseaseRisk,
    GrowthPotential,
    WeedPressure,
    WaterSummaries(Uuid),
}

/// Delegates to a `MemoryStore` but fails one replace-write
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    fault: Fault,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>, fault: Fault) -> Self {
        Self { inner, fault }
    }

    fn check(&self, write: Fault) -> AppResult<()> {
        if write == self.fault {
            return Err(AppError::Internal(format!("write refused: {:?}", write)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn ping(&self) -> AppResult<()> {
        self.inner.ping().await
    }

    async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.inner.list_locations().await
    }

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        self.inner.get_location(id).await
    }

    async fn list_lawns(&self, location_id: Uuid) -> AppResult<Vec<Lawn>> {
        self.inner.list_lawns(location_id).await
    }

    async fn list_irrigation(
        &self,
        lawn_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<IrrigationEntry>> {
        self.inner.list_irrigation(lawn_id, range).await
    }

    async fn list_active_weed_species(&self) -> AppResult<Vec<WeedSpecies>> {
        self.inner.list_active_weed_species().await
    }

    async fn load_weather(
        &self,
        location_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<DailyObservation>> {
        self.inner.load_weather(location_id, range).await
    }

    async fn earliest_weather_date(&self, location_id: Uuid) -> AppResult<Option<NaiveDate>> {
        self.inner.earliest_weather_date(location_id).await
    }

    async fn upsert_weather(&self, observations: &[DailyObservation]) -> AppResult<u64> {
        self.inner.upsert_weather(observations).await
    }

    async fn list_gdd_models(&self, location_id: Uuid) -> AppResult<Vec<GddModelConfig>> {
        self.inner.list_gdd_models(location_id).await
    }

    async fn get_gdd_model(&self, id: Uuid) -> AppResult<Option<GddModelConfig>> {
        self.inner.get_gdd_model(id).await
    }

    async fn insert_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        self.inner.insert_gdd_model(model).await
    }

    async fn update_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        self.inner.update_gdd_model(model).await
    }

    async fn list_gdd_values(&self, model_id: Uuid) -> AppResult<Vec<GddValue>> {
        self.inner.list_gdd_values(model_id).await
    }

    async fn list_resets(&self, model_id: Uuid) -> AppResult<Vec<ResetEvent>> {
        self.inner.list_resets(model_id).await
    }

    async fn put_reset(&self, event: &ResetEvent) -> AppResult<()> {
        self.inner.put_reset(event).await
    }

    async fn delete_reset(&self, model_id: Uuid, reset_id: Uuid) -> AppResult<Option<ResetEvent>> {
        self.inner.delete_reset(model_id, reset_id).await
    }

    async fn delete_resets_of_type(
        &self,
        model_id: Uuid,
        reset_type: ResetType,
    ) -> AppResult<u64> {
        self.inner.delete_resets_of_type(model_id, reset_type).await
    }

    async fn replace_gdd_output(
        &self,
        model_id: Uuid,
        values: &[GddValue],
        ledger: &[ResetEvent],
    ) -> AppResult<()> {
        self.inner.replace_gdd_output(model_id, values, ledger).await
    }

    async fn replace_disease_risk(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[DiseaseRiskPoint],
    ) -> AppResult<()> {
        self.check(Fault::DiseaseRisk)?;
        self.inner.replace_disease_risk(location_id, from, points).await
    }

    async fn replace_growth_potential(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[GrowthPotentialPoint],
    ) -> AppResult<()> {
        self.check(Fault::GrowthPotential)?;
        self.inner
            .replace_growth_potential(location_id, from, points)
            .await
    }

    async fn replace_weed_pressure(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[WeedPressurePoint],
    ) -> AppResult<()> {
        self.check(Fault::WeedPressure)?;
        self.inner.replace_weed_pressure(location_id, from, points).await
    }

    async fn replace_water_summaries(
        &self,
        lawn_id: Uuid,
        from: NaiveDate,
        summaries: &[WaterWeekSummary],
    ) -> AppResult<()> {
        self.check(Fault::WaterSummaries(lawn_id))?;
        self.inner
            .replace_water_summaries(lawn_id, from, summaries)
            .await
    }

    async fn record_task(&self, record: &TaskRecord) -> AppResult<()> {
        self.inner.record_task(record).await
    }
}
