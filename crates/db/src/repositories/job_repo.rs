//! Repository for the `jobs` table: the durable background queue.
//!
//! Delivery is at-least-once. A claimed job that never reaches a terminal
//! status (worker crash, lost connection) is handed back to the queue by
//! [`JobRepo::requeue_stale`] and runs again.

use eventreg_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::job::{Job, JobStatusView};
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, job_type, status_id, parameters, result, error_message, attempts, \
    submitted_by, submitted_at, claimed_at, completed_at";

/// Provides queue operations for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Add a pending job to the queue. Returns immediately with the job row.
    pub async fn enqueue(
        pool: &PgPool,
        job_type: &str,
        parameters: &serde_json::Value,
        submitted_by: Option<DbId>,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, status_id, parameters, submitted_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_type)
            .bind(JobStatus::Pending.id())
            .bind(parameters)
            .bind(submitted_by)
            .fetch_one(pool)
            .await
    }

    /// Find a job by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Poll view of a job of `job_type` submitted by `submitted_by`.
    ///
    /// `None` when the id is unknown or belongs to another type or submitter,
    /// so pollers only see their own jobs.
    pub async fn status(
        pool: &PgPool,
        id: DbId,
        job_type: &str,
        submitted_by: DbId,
    ) -> Result<Option<JobStatusView>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs WHERE id = $1 AND job_type = $2 AND submitted_by = $3"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(job_type)
            .bind(submitted_by)
            .fetch_optional(pool)
            .await?;
        Ok(job.map(|job| job.status_view()))
    }

    /// Atomically claim the oldest pending job.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent runners never claim
    /// the same job. Increments `attempts`.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $1, claimed_at = NOW(), attempts = attempts + 1 \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id = $2 \
                 ORDER BY submitted_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Running.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a running job as completed with its result payload.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET status_id = $2, result = $3, completed_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a running job as failed. No automatic retry is scheduled.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return jobs claimed before `claimed_before` that are still running to
    /// the pending state so another runner picks them up.
    ///
    /// Returns the number of jobs requeued.
    pub async fn requeue_stale(
        pool: &PgPool,
        claimed_before: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET status_id = $1, claimed_at = NULL \
             WHERE status_id = $2 AND claimed_at < $3",
        )
        .bind(JobStatus::Pending.id())
        .bind(JobStatus::Running.id())
        .bind(claimed_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count jobs of a type that are pending or running.
    pub async fn count_active_of_type(pool: &PgPool, job_type: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE job_type = $1 AND status_id IN ($2, $3)",
        )
            .bind(job_type)
            .bind(JobStatus::Pending.id())
            .bind(JobStatus::Running.id())
            .fetch_one(pool)
            .await
    }
}
