//! In-process store keyed exactly like the database unique constraints

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    DailyObservation, DateRange, DiseaseRiskPoint, GddModelConfig, GddValue,
    GrowthPotentialPoint, IrrigationEntry, Lawn, Location, ObservationKind, ResetEvent, ResetType,
    TaskRecord, WaterWeekSummary, WeedPressurePoint, WeedSpecies,
};
use uuid::Uuid;

use super::Store;
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    locations: BTreeMap<Uuid, Location>,
    lawns: Vec<Lawn>,
    irrigation: Vec<IrrigationEntry>,
    weed_species: Vec<WeedSpecies>,
    weather: BTreeMap<(Uuid, NaiveDate, ObservationKind), DailyObservation>,
    gdd_models: BTreeMap<Uuid, GddModelConfig>,
    gdd_values: BTreeMap<(Uuid, NaiveDate), GddValue>,
    resets: BTreeMap<(Uuid, NaiveDate), ResetEvent>,
    disease: BTreeMap<(Uuid, NaiveDate, String), DiseaseRiskPoint>,
    growth: BTreeMap<(Uuid, NaiveDate), GrowthPotentialPoint>,
    weed: BTreeMap<(Uuid, NaiveDate, Uuid), WeedPressurePoint>,
    water: BTreeMap<(Uuid, NaiveDate), WaterWeekSummary>,
    tasks: Vec<TaskRecord>,
}

/// Deterministic [`Store`] used by tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // Seeding helpers

    pub fn add_location(&self, location: Location) {
        self.tables().locations.insert(location.id, location);
    }

    pub fn add_lawn(&self, lawn: Lawn) {
        self.tables().lawns.push(lawn);
    }

    pub fn add_irrigation(&self, entry: IrrigationEntry) {
        self.tables().irrigation.push(entry);
    }

    pub fn add_weed_species(&self, species: WeedSpecies) {
        self.tables().weed_species.push(species);
    }

    // Snapshots

    pub fn weather(&self, location_id: Uuid) -> Vec<DailyObservation> {
        self.tables()
            .weather
            .values()
            .filter(|obs| obs.location_id == location_id)
            .cloned()
            .collect()
    }

    pub fn disease_risk(&self, location_id: Uuid) -> Vec<DiseaseRiskPoint> {
        self.tables()
            .disease
            .values()
            .filter(|p| p.location_id == location_id)
            .cloned()
            .collect()
    }

    pub fn growth_potential(&self, location_id: Uuid) -> Vec<GrowthPotentialPoint> {
        self.tables()
            .growth
            .values()
            .filter(|p| p.location_id == location_id)
            .cloned()
            .collect()
    }

    pub fn weed_pressure(&self, location_id: Uuid) -> Vec<WeedPressurePoint> {
        self.tables()
            .weed
            .values()
            .filter(|p| p.location_id == location_id)
            .cloned()
            .collect()
    }

    pub fn water_summaries(&self, lawn_id: Uuid) -> Vec<WaterWeekSummary> {
        self.tables()
            .water
            .values()
            .filter(|s| s.lawn_id == lawn_id)
            .cloned()
            .collect()
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.tables().tasks.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }

    async fn list_locations(&self) -> AppResult<Vec<Location>> {
        Ok(self.lock()?.locations.values().cloned().collect())
    }

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        Ok(self.lock()?.locations.get(&id).cloned())
    }

    async fn list_lawns(&self, location_id: Uuid) -> AppResult<Vec<Lawn>> {
        Ok(self
            .lock()?
            .lawns
            .iter()
            .filter(|lawn| lawn.location_id == location_id)
            .cloned()
            .collect())
    }

    async fn list_irrigation(
        &self,
        lawn_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<IrrigationEntry>> {
        Ok(self
            .lock()?
            .irrigation
            .iter()
            .filter(|e| e.lawn_id == lawn_id && range.contains(e.date))
            .cloned()
            .collect())
    }

    async fn list_active_weed_species(&self) -> AppResult<Vec<WeedSpecies>> {
        Ok(self
            .lock()?
            .weed_species
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn load_weather(
        &self,
        location_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<DailyObservation>> {
        Ok(self
            .lock()?
            .weather
            .values()
            .filter(|obs| obs.location_id == location_id && range.contains(obs.date))
            .cloned()
            .collect())
    }

    async fn earliest_weather_date(&self, location_id: Uuid) -> AppResult<Option<NaiveDate>> {
        Ok(self
            .lock()?
            .weather
            .values()
            .filter(|obs| obs.location_id == location_id)
            .map(|obs| obs.date)
            .min())
    }

    async fn upsert_weather(&self, observations: &[DailyObservation]) -> AppResult<u64> {
        let mut tables = self.lock()?;
        let mut written = 0;
        for obs in observations {
            let historical_key = (obs.location_id, obs.date, ObservationKind::Historical);
            let forecast_key = (obs.location_id, obs.date, ObservationKind::Forecast);
            match obs.kind {
                ObservationKind::Historical => {
                    tables.weather.remove(&forecast_key);
                    if !tables.weather.contains_key(&historical_key) {
                        tables.weather.insert(historical_key, obs.clone());
                        written += 1;
                    }
                }
                ObservationKind::Forecast => {
                    if !tables.weather.contains_key(&historical_key) {
                        tables.weather.insert(forecast_key, obs.clone());
                        written += 1;
                    }
                }
            }
        }
        Ok(written)
    }

    async fn list_gdd_models(&self, location_id: Uuid) -> AppResult<Vec<GddModelConfig>> {
        Ok(self
            .lock()?
            .gdd_models
            .values()
            .filter(|m| m.location_id == location_id)
            .cloned()
            .collect())
    }

    async fn get_gdd_model(&self, id: Uuid) -> AppResult<Option<GddModelConfig>> {
        Ok(self.lock()?.gdd_models.get(&id).cloned())
    }

    async fn insert_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        self.lock()?.gdd_models.insert(model.id, model.clone());
        Ok(())
    }

    async fn update_gdd_model(&self, model: &GddModelConfig) -> AppResult<()> {
        let mut tables = self.lock()?;
        match tables.gdd_models.get_mut(&model.id) {
            Some(existing) => {
                *existing = model.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("GDD model".to_string())),
        }
    }

    async fn list_gdd_values(&self, model_id: Uuid) -> AppResult<Vec<GddValue>> {
        Ok(self
            .lock()?
            .gdd_values
            .values()
            .filter(|v| v.model_id == model_id)
            .cloned()
            .collect())
    }

    async fn list_resets(&self, model_id: Uuid) -> AppResult<Vec<ResetEvent>> {
        Ok(self
            .lock()?
            .resets
            .values()
            .filter(|r| r.model_id == model_id)
            .cloned()
            .collect())
    }

    async fn put_reset(&self, event: &ResetEvent) -> AppResult<()> {
        self.lock()?
            .resets
            .insert((event.model_id, event.date), event.clone());
        Ok(())
    }

    async fn delete_reset(&self, model_id: Uuid, reset_id: Uuid) -> AppResult<Option<ResetEvent>> {
        let mut tables = self.lock()?;
        let key = tables
            .resets
            .iter()
            .find(|(_, r)| r.model_id == model_id && r.id == reset_id)
            .map(|(key, _)| *key);
        Ok(key.and_then(|key| tables.resets.remove(&key)))
    }

    async fn delete_resets_of_type(
        &self,
        model_id: Uuid,
        reset_type: ResetType,
    ) -> AppResult<u64> {
        let mut tables = self.lock()?;
        let before = tables.resets.len();
        tables
            .resets
            .retain(|_, r| !(r.model_id == model_id && r.reset_type == reset_type));
        Ok((before - tables.resets.len()) as u64)
    }

    async fn replace_gdd_output(
        &self,
        model_id: Uuid,
        values: &[GddValue],
        ledger: &[ResetEvent],
    ) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables.gdd_values.retain(|(id, _), _| *id != model_id);
        tables
            .resets
            .retain(|(id, _), event| *id != model_id || event.reset_type == ResetType::Manual);
        for value in values {
            tables
                .gdd_values
                .insert((value.model_id, value.date), value.clone());
        }
        for event in ledger {
            let key = (event.model_id, event.date);
            if event.reset_type == ResetType::Manual {
                if let Some(stored) = tables.resets.get_mut(&key) {
                    if stored.reset_type == ResetType::Manual {
                        stored.run_number = event.run_number;
                    }
                }
            } else {
                tables.resets.entry(key).or_insert_with(|| event.clone());
            }
        }
        Ok(())
    }

    async fn replace_disease_risk(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[DiseaseRiskPoint],
    ) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables
            .disease
            .retain(|(id, date, _), _| !(*id == location_id && *date >= from));
        for p in points {
            tables
                .disease
                .insert((p.location_id, p.date, p.disease.clone()), p.clone());
        }
        Ok(())
    }

    async fn replace_growth_potential(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[GrowthPotentialPoint],
    ) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables
            .growth
            .retain(|(id, date), _| !(*id == location_id && *date >= from));
        for p in points {
            tables.growth.insert((p.location_id, p.date), p.clone());
        }
        Ok(())
    }

    async fn replace_weed_pressure(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[WeedPressurePoint],
    ) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables
            .weed
            .retain(|(id, date, _), _| !(*id == location_id && *date >= from));
        for p in points {
            tables
                .weed
                .insert((p.location_id, p.date, p.weed_species_id), p.clone());
        }
        Ok(())
    }

    async fn replace_water_summaries(
        &self,
        lawn_id: Uuid,
        from: NaiveDate,
        summaries: &[WaterWeekSummary],
    ) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables
            .water
            .retain(|(id, week), _| !(*id == lawn_id && *week >= from));
        for s in summaries {
            tables.water.insert((s.lawn_id, s.week_start), s.clone());
        }
        Ok(())
    }

    async fn record_task(&self, record: &TaskRecord) -> AppResult<()> {
        let mut tables = self.lock()?;
        match tables.tasks.iter_mut().find(|t| t.task_id == record.task_id) {
            Some(existing) => *existing = record.clone(),
            None => tables.tasks.push(record.clone()),
        }
        Ok(())
    }
}
