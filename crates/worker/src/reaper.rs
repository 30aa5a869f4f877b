//! Redelivery of abandoned jobs.
//!
//! A job stays `running` if its runner dies mid-flight. This loop returns
//! such jobs to `pending` once they have been claimed for longer than the
//! visibility timeout, which makes delivery at-least-once.

use std::time::Duration;

use chrono::Utc;
use eventreg_db::repositories::JobRepo;
use eventreg_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Sweep period as a fraction of the visibility timeout, floored at one second.
fn sweep_interval(visibility_timeout: Duration) -> Duration {
    (visibility_timeout / 4).max(Duration::from_secs(1))
}

/// Run the stale-claim sweep until `cancel` is triggered.
pub async fn run(pool: DbPool, visibility_timeout: Duration, cancel: CancellationToken) {
    let every = sweep_interval(visibility_timeout);
    tracing::info!(
        visibility_timeout_secs = visibility_timeout.as_secs(),
        interval_secs = every.as_secs(),
        "Stale job reaper started"
    );

    let timeout = chrono::Duration::from_std(visibility_timeout)
        .unwrap_or_else(|_| chrono::Duration::minutes(5));
    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale job reaper stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - timeout;
                match JobRepo::requeue_stale(&pool, cutoff).await {
                    Ok(0) => tracing::debug!("Stale job reaper: nothing to requeue"),
                    Ok(requeued) => {
                        tracing::warn!(requeued, "Stale job reaper: requeued abandoned jobs")
                    }
                    Err(e) => tracing::error!(error = %e, "Stale job reaper: sweep failed"),
                }
            }
        }
    }
}
