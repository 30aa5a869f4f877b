//! Once-a-day trigger for the reminder job.
//!
//! Checks every minute; on the first check at or after the configured UTC
//! hour it enqueues `send_daily_reminders`, unless one is already pending or
//! running. Enqueueing twice is harmless since the reminder ledger dedupes
//! per event and date.

use std::time::Duration;

use chrono::{NaiveDate, Timelike, Utc};
use eventreg_core::jobs::{RemindersParams, JOB_SEND_DAILY_REMINDERS};
use eventreg_core::types::Timestamp;
use eventreg_db::repositories::JobRepo;
use eventreg_db::DbPool;
use tokio_util::sync::CancellationToken;

const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Whether a check at `now` should enqueue, given the date of the last enqueue.
pub fn is_due(now: Timestamp, reminder_hour_utc: u32, last_enqueued: Option<NaiveDate>) -> bool {
    let today = now.date_naive();
    now.hour() >= reminder_hour_utc && last_enqueued != Some(today)
}

/// Run the scheduler until `cancel` is triggered.
pub async fn run(pool: DbPool, reminder_hour_utc: u32, cancel: CancellationToken) {
    tracing::info!(reminder_hour_utc, "Reminder scheduler started");

    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    let mut last_enqueued: Option<NaiveDate> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                let now = Utc::now();
                if !is_due(now, reminder_hour_utc, last_enqueued) {
                    continue;
                }
                match enqueue_if_idle(&pool).await {
                    Ok(Some(job_id)) => {
                        tracing::info!(job_id, "Daily reminder job enqueued");
                        last_enqueued = Some(now.date_naive());
                    }
                    Ok(None) => {
                        tracing::debug!("Daily reminder job already active");
                        last_enqueued = Some(now.date_naive());
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to enqueue daily reminder job"),
                }
            }
        }
    }
}

async fn enqueue_if_idle(pool: &DbPool) -> Result<Option<i64>, sqlx::Error> {
    if JobRepo::count_active_of_type(pool, JOB_SEND_DAILY_REMINDERS).await? > 0 {
        return Ok(None);
    }
    let params = serde_json::to_value(RemindersParams::default())
        .unwrap_or_else(|_| serde_json::json!({}));
    let job = JobRepo::enqueue(pool, JOB_SEND_DAILY_REMINDERS, &params, None).await?;
    Ok(Some(job.id))
}
