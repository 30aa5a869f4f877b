//! Job handlers, keyed by `job_type`.
//!
//! [`dispatch`] decodes a job's parameters and runs the matching handler.
//! A handler's `Ok` value is stored as the job result; an `Err` marks the
//! job failed with the error's display text.

pub mod confirmation;
pub mod reminders;
pub mod report;

use chrono::Utc;
use eventreg_core::jobs::{
    ConfirmationParams, ReportParams, JOB_GENERATE_REGISTRATION_REPORT,
    JOB_SEND_DAILY_REMINDERS, JOB_SEND_REGISTRATION_CONFIRMATION,
};
use eventreg_db::models::job::Job;
use eventreg_delivery::{EmailError, StorageError};
use serde::de::DeserializeOwned;

use crate::context::JobContext;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("Invalid parameters for {job_type}: {message}")]
    InvalidParameters { job_type: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Result encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

fn decode<T: DeserializeOwned>(job: &Job) -> Result<T, JobError> {
    serde_json::from_value(job.parameters.clone()).map_err(|e| JobError::InvalidParameters {
        job_type: job.job_type.clone(),
        message: e.to_string(),
    })
}

/// Run the handler for `job` and return the value to store as its result.
pub async fn dispatch(ctx: &JobContext, job: &Job) -> Result<serde_json::Value, JobError> {
    match job.job_type.as_str() {
        JOB_SEND_REGISTRATION_CONFIRMATION => {
            let params: ConfirmationParams = decode(job)?;
            confirmation::run(ctx, &params).await
        }
        JOB_GENERATE_REGISTRATION_REPORT => {
            let params: ReportParams = decode(job)?;
            let outcome = report::run(ctx, params).await?;
            Ok(serde_json::to_value(outcome)?)
        }
        JOB_SEND_DAILY_REMINDERS => {
            let summary = reminders::run(ctx, Utc::now()).await?;
            Ok(serde_json::to_value(summary)?)
        }
        other => Err(JobError::UnknownJobType(other.to_string())),
    }
}
