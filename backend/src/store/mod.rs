//! Persistence seam between the services and the database
//!
//! Every `replace_*` method deletes the rows for its key range and inserts the
//! new rows as a single unit, so readers never observe a half-written series.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    DailyObservation, DateRange, DiseaseRiskPoint, GddModelConfig, GddValue,
    GrowthPotentialPoint, IrrigationEntry, Lawn, Location, ResetEvent, ResetType, TaskRecord,
    WaterWeekSummary, WeedPressurePoint, WeedSpecies,
};
use uuid::Uuid;

use crate::error::AppResult;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check
    async fn ping(&self) -> AppResult<()>;

    // Locations, lawns, species

    async fn list_locations(&self) -> AppResult<Vec<Location>>;

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>>;

    /// Lawns of a location, oldest first
    async fn list_lawns(&self, location_id: Uuid) -> AppResult<Vec<Lawn>>;

    async fn list_irrigation(&self, lawn_id: Uuid, range: DateRange)
        -> AppResult<Vec<IrrigationEntry>>;

    async fn list_active_weed_species(&self) -> AppResult<Vec<WeedSpecies>>;

    // Weather

    /// Stored observations of both kinds within `range`
    async fn load_weather(
        &self,
        location_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<DailyObservation>>;

    /// Earliest stored observation date for a location
    async fn earliest_weather_date(&self, location_id: Uuid) -> AppResult<Option<NaiveDate>>;

    /// Store observations; historical rows are never overwritten and
    /// supersede forecasts for the same date. Returns rows written.
    async fn upsert_weather(&self, observations: &[DailyObservation]) -> AppResult<u64>;

    // GDD models and ledger

    async fn list_gdd_models(&self, location_id: Uuid) -> AppResult<Vec<GddModelConfig>>;

    async fn get_gdd_model(&self, id: Uuid) -> AppResult<Option<GddModelConfig>>;

    async fn insert_gdd_model(&self, model: &GddModelConfig) -> AppResult<()>;

    async fn update_gdd_model(&self, model: &GddModelConfig) -> AppResult<()>;

    async fn list_gdd_values(&self, model_id: Uuid) -> AppResult<Vec<GddValue>>;

    /// Reset ledger ordered by date
    async fn list_resets(&self, model_id: Uuid) -> AppResult<Vec<ResetEvent>>;

    /// Insert a reset, replacing any entry on the same date
    async fn put_reset(&self, event: &ResetEvent) -> AppResult<()>;

    /// Returns the removed entry, if it existed
    async fn delete_reset(&self, model_id: Uuid, reset_id: Uuid) -> AppResult<Option<ResetEvent>>;

    async fn delete_resets_of_type(&self, model_id: Uuid, reset_type: ResetType)
        -> AppResult<u64>;

    /// Replace a model's values and derived ledger entries together.
    ///
    /// Manual entries are never inserted or deleted here, only renumbered, and
    /// a derived entry never displaces a manual one on the same date.
    async fn replace_gdd_output(
        &self,
        model_id: Uuid,
        values: &[GddValue],
        ledger: &[ResetEvent],
    ) -> AppResult<()>;

    // Derived location series, replaced from `from` onwards

    async fn replace_disease_risk(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[DiseaseRiskPoint],
    ) -> AppResult<()>;

    async fn replace_growth_potential(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[GrowthPotentialPoint],
    ) -> AppResult<()>;

    async fn replace_weed_pressure(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        points: &[WeedPressurePoint],
    ) -> AppResult<()>;

    /// Replace a lawn's weeks starting on or after `from`
    async fn replace_water_summaries(
        &self,
        lawn_id: Uuid,
        from: NaiveDate,
        summaries: &[WaterWeekSummary],
    ) -> AppResult<()>;

    // Task bookkeeping

    /// Insert or update a task record by `task_id`
    async fn record_task(&self, record: &TaskRecord) -> AppResult<()>;
}
