//! GDD model management and reset ledger commands
//!
//! Every command stores its change and then queues a recomputation of the
//! affected model.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    validate_create_gdd_model, validate_manual_reset_date, validate_update_gdd_model,
    CreateGddModel, GddModelConfig, ResetEvent, ResetType, UpdateGddModel,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::pool::{RecalcJob, RecalcPool};
use crate::store::Store;

/// GDD model service
#[derive(Clone)]
pub struct GddModelService {
    store: Arc<dyn Store>,
    pool: RecalcPool,
}

impl GddModelService {
    pub fn new(store: Arc<dyn Store>, pool: RecalcPool) -> Self {
        Self { store, pool }
    }

    /// Create a model with its initial ledger entry
    pub async fn create_model(&self, input: CreateGddModel) -> AppResult<GddModelConfig> {
        validate_create_gdd_model(&input)?;
        if self.store.get_location(input.location_id).await?.is_none() {
            return Err(AppError::NotFound("Location".to_string()));
        }

        let now = Utc::now();
        let model = GddModelConfig {
            id: Uuid::new_v4(),
            location_id: input.location_id,
            name: input.name.trim().to_string(),
            base_temperature: input.base_temperature,
            unit: input.unit,
            start_date: input.start_date,
            threshold: input.threshold,
            reset_on_threshold: input.reset_on_threshold,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_gdd_model(&model).await?;
        self.store
            .put_reset(&ResetEvent::new(model.id, model.start_date, ResetType::Initial, 1))
            .await?;

        tracing::info!(model_id = %model.id, location_id = %model.location_id, "GDD model created");
        self.trigger(model.id);
        Ok(model)
    }

    /// Update parameters; any change replaces every stored value of the model
    pub async fn update_model(&self, id: Uuid, input: UpdateGddModel) -> AppResult<GddModelConfig> {
        validate_update_gdd_model(&input)?;
        let mut model = self.model(id).await?;

        if let Some(start_date) = input.start_date.filter(|date| *date != model.start_date) {
            let ledger = self.store.list_resets(id).await?;
            if ledger
                .iter()
                .any(|event| event.reset_type == ResetType::Manual && event.date == start_date)
            {
                return Err(AppError::Validation {
                    field: "start_date".to_string(),
                    message: "A manual reset is already recorded on this date".to_string(),
                });
            }
        }

        if model.apply(input) {
            model.updated_at = Utc::now();
            self.store.update_gdd_model(&model).await?;
            tracing::info!(model_id = %id, "GDD model updated");
            self.trigger(id);
        }
        Ok(model)
    }

    /// Queue a recomputation; a full queue is reported to the caller
    pub async fn recalculate_model(&self, id: Uuid) -> AppResult<()> {
        self.model(id).await?;
        self.pool.submit(RecalcJob::GddModel(id))
    }

    /// Record a manual reset, replacing any entry on the same date
    pub async fn create_manual_reset(
        &self,
        id: Uuid,
        date: chrono::NaiveDate,
    ) -> AppResult<ResetEvent> {
        let model = self.model(id).await?;
        validate_manual_reset_date(model.start_date, date)?;

        // Run number is provisional until the ledger is rebuilt
        let event = ResetEvent::new(id, date, ResetType::Manual, 0);
        self.store.put_reset(&event).await?;

        tracing::info!(model_id = %id, date = %date, "manual reset recorded");
        self.trigger(id);
        Ok(event)
    }

    /// Delete one reset; the initial entry is permanent
    pub async fn delete_reset(&self, id: Uuid, reset_id: Uuid) -> AppResult<()> {
        self.model(id).await?;
        let ledger = self.store.list_resets(id).await?;
        let event = ledger
            .iter()
            .find(|event| event.id == reset_id)
            .ok_or_else(|| AppError::NotFound("Reset".to_string()))?;
        if event.reset_type == ResetType::Initial {
            return Err(initial_not_deletable());
        }

        self.store.delete_reset(id, reset_id).await?;
        tracing::info!(model_id = %id, reset_id = %reset_id, "reset deleted");
        self.trigger(id);
        Ok(())
    }

    /// Delete every reset of one type, returning how many were removed
    pub async fn delete_resets_of_type(&self, id: Uuid, reset_type: ResetType) -> AppResult<u64> {
        if reset_type == ResetType::Initial {
            return Err(initial_not_deletable());
        }
        self.model(id).await?;

        let deleted = self.store.delete_resets_of_type(id, reset_type).await?;
        tracing::info!(model_id = %id, reset_type = %reset_type, deleted, "resets deleted");
        self.trigger(id);
        Ok(deleted)
    }

    async fn model(&self, id: Uuid) -> AppResult<GddModelConfig> {
        self.store
            .get_gdd_model(id)
            .await?
            .ok_or_else(|| AppError::NotFound("GDD model".to_string()))
    }

    fn trigger(&self, id: Uuid) {
        // The change is already stored; the next scheduled cycle picks it up if the queue is full
        if let Err(e) = self.pool.submit(RecalcJob::GddModel(id)) {
            tracing::warn!(model_id = %id, error = %e, "could not queue GDD recomputation");
        }
    }
}

fn initial_not_deletable() -> AppError {
    AppError::Validation {
        field: "type".to_string(),
        message: "The initial reset cannot be deleted".to_string(),
    }
}
