//! Job entity model for the durable background queue.

use eventreg_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{JobStatus, StatusId};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub status_id: StatusId,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub submitted_by: Option<DbId>,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// What a caller polling a job id gets back.
///
/// Running jobs are still reported as `pending`; a failed job is `completed`
/// with an `{"error": ...}` result, so pollers only ever see two states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatusView {
    pub task_id: DbId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Job {
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_id(self.status_id)
    }

    pub fn status_view(&self) -> JobStatusView {
        match self.status() {
            Some(JobStatus::Completed) => JobStatusView {
                task_id: self.id,
                status: "completed",
                result: Some(self.result.clone().unwrap_or(serde_json::Value::Null)),
            },
            Some(JobStatus::Failed) => JobStatusView {
                task_id: self.id,
                status: "completed",
                result: Some(serde_json::json!({
                    "error": self.error_message.clone().unwrap_or_default(),
                })),
            },
            _ => JobStatusView {
                task_id: self.id,
                status: "pending",
                result: None,
            },
        }
    }
}
