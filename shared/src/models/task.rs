//! Background task bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Started,
    Success,
    Failure,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Started => "started",
            TaskState::Success => "success",
            TaskState::Failure => "failure",
        }
    }
}

/// Outcome of one recalculation task, kept for observability only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    pub task_id: String,
    pub task_name: String,
    pub location_id: Option<Uuid>,
    pub state: TaskState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl TaskRecord {
    pub fn started(task_id: impl Into<String>, task_name: &str, location_id: Option<Uuid>) -> Self {
        Self {
            task_id: task_id.into(),
            task_name: task_name.to_string(),
            location_id,
            state: TaskState::Started,
            started_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        }
    }

    pub fn succeed(mut self, result: impl Into<String>) -> Self {
        self.state = TaskState::Success;
        self.finished_at = Some(Utc::now());
        self.result = Some(result.into());
        self
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.state = TaskState::Failure;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.into());
        self
    }
}
