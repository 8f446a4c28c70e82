//! Bounded worker pool for on-demand recalculations
//!
//! Requests are queued on a bounded channel and drained by a fixed number of
//! workers. A full queue is reported to the caller instead of growing.

use std::sync::Arc;

use shared::TaskRecord;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::recalc::RecalcService;

/// Unit of work accepted by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalcJob {
    Location(Uuid),
    GddModel(Uuid),
}

impl RecalcJob {
    pub fn task_name(&self) -> &'static str {
        match self {
            RecalcJob::Location(_) => "recalculate_location",
            RecalcJob::GddModel(_) => "recalculate_gdd_model",
        }
    }
}

/// Cloneable submission handle
#[derive(Clone)]
pub struct RecalcPool {
    tx: mpsc::Sender<RecalcJob>,
}

/// Worker tasks of a pool; resolves once every sender is dropped and the queue is drained
pub struct PoolWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl RecalcPool {
    /// Spawn `pool_size` workers behind a queue of `queue_capacity` jobs
    pub fn start(
        recalc: Arc<RecalcService>,
        pool_size: usize,
        queue_capacity: usize,
    ) -> (Self, PoolWorkers) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let handles = (0..pool_size.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let recalc = Arc::clone(&recalc);
                tokio::spawn(async move {
                    loop {
                        // Hold the receiver only while waiting for the next job
                        let job = { rx.lock().await.recv().await };
                        match job {
                            Some(job) => run_job(&recalc, job).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker, "recalculation worker stopped");
                })
            })
            .collect();

        (Self { tx }, PoolWorkers { handles })
    }

    /// Queue a job without waiting
    pub fn submit(&self, job: RecalcJob) -> AppResult<()> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) => {
                tracing::warn!(?job, "recalculation queue full");
                AppError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("recalculation pool stopped".to_string())
            }
        })
    }
}

impl PoolWorkers {
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "recalculation worker panicked");
            }
        }
    }
}

async fn run_job(recalc: &RecalcService, job: RecalcJob) {
    let store = recalc.store();
    let (location_id, subject) = match job {
        RecalcJob::Location(id) => (Some(id), id),
        RecalcJob::GddModel(id) => (None, id),
    };
    let record = TaskRecord::started(
        format!("{}-{}", job.task_name(), Uuid::new_v4()),
        job.task_name(),
        location_id,
    );
    if let Err(e) = store.record_task(&record).await {
        tracing::warn!(error = %e, "failed to record task start");
    }

    let outcome = match job {
        RecalcJob::Location(id) => recalc
            .recalculate(id)
            .await
            .and_then(|report| {
                serde_json::to_string(&report).map_err(|e| AppError::Internal(e.to_string()))
            }),
        RecalcJob::GddModel(id) => recalc
            .recalculate_gdd_model(id)
            .await
            .map(|values| format!("{} values", values)),
    };

    let record = match outcome {
        Ok(result) => record.succeed(result),
        Err(e) => {
            tracing::warn!(
                subject = %subject,
                task = job.task_name(),
                error = %e,
                "recalculation failed"
            );
            record.fail(e.to_string())
        }
    };
    if let Err(e) = store.record_task(&record).await {
        tracing::warn!(error = %e, "failed to record task outcome");
    }
}
