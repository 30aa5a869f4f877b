//! Polling job runner.
//!
//! Each runner claims pending jobs with [`JobRepo::claim_next`] (which uses
//! `SELECT FOR UPDATE SKIP LOCKED`, so runners never share a job), executes
//! them through [`jobs::dispatch`] and records the outcome on the job row.

use std::time::Duration;

use eventreg_db::repositories::JobRepo;
use tokio_util::sync::CancellationToken;

use crate::context::JobContext;
use crate::jobs;

/// One job-executing loop. Spawn several for concurrency.
pub struct JobRunner {
    ctx: JobContext,
    poll_interval: Duration,
    index: usize,
}

impl JobRunner {
    pub fn new(ctx: JobContext, poll_interval: Duration, index: usize) -> Self {
        Self {
            ctx,
            poll_interval,
            index,
        }
    }

    /// Run until `cancel` is triggered. A job already in progress is
    /// finished before the loop exits.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            runner = self.index,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Job runner started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(runner = self.index, "Job runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // Drain the queue before waiting for the next tick.
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        match self.run_once().await {
                            Ok(true) => continue,
                            Ok(false) => break,
                            Err(e) => {
                                tracing::error!(runner = self.index, error = %e, "Job poll failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Claim and execute at most one job. Returns `false` when the queue is empty.
    pub async fn run_once(&self) -> Result<bool, sqlx::Error> {
        let Some(job) = JobRepo::claim_next(&self.ctx.pool).await? else {
            return Ok(false);
        };

        tracing::info!(
            runner = self.index,
            job_id = job.id,
            job_type = %job.job_type,
            attempt = job.attempts,
            "Job claimed",
        );

        match jobs::dispatch(&self.ctx, &job).await {
            Ok(result) => {
                JobRepo::complete(&self.ctx.pool, job.id, &result).await?;
                tracing::info!(job_id = job.id, job_type = %job.job_type, "Job completed");
            }
            Err(e) => {
                tracing::error!(
                    job_id = job.id,
                    job_type = %job.job_type,
                    error = %e,
                    "Job failed",
                );
                JobRepo::fail(&self.ctx.pool, job.id, &e.to_string()).await?;
            }
        }

        Ok(true)
    }
}
