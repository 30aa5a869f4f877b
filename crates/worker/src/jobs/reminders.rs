//! Daily reminders for events starting tomorrow.
//!
//! Each (event, date) pair is claimed in `reminder_deliveries` before any
//! mail goes out, so a second run on the same day, or a concurrent run on
//! another worker, skips events that were already handled.

use chrono::NaiveDate;
use eventreg_core::notifications;
use eventreg_core::types::{DbId, Timestamp};
use eventreg_db::models::registration::ReminderRecipient;
use eventreg_db::repositories::{RegistrationRepo, ReminderRepo};
use serde::Serialize;

use super::JobError;
use crate::context::JobContext;

/// Result of one reminder run, stored on the job row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderSummary {
    pub reminder_date: Option<NaiveDate>,
    /// Events whose reminders this run sent.
    pub events: usize,
    /// Events skipped because an earlier run already claimed them.
    pub skipped_events: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Split recipients (ordered by event) into one slice per event.
fn group_by_event(recipients: &[ReminderRecipient]) -> Vec<(DbId, &[ReminderRecipient])> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=recipients.len() {
        if i == recipients.len() || recipients[i].event_id != recipients[start].event_id {
            groups.push((recipients[start].event_id, &recipients[start..i]));
            start = i;
        }
    }
    groups
}

/// Clamp a send count to the `recipient_count` column range.
fn recipient_count(sent: usize) -> i32 {
    i32::try_from(sent).unwrap_or(i32::MAX)
}

/// Send reminders for every event whose start date is the day after `now`.
///
/// Per-recipient send failures are logged and counted, not raised.
pub async fn run(ctx: &JobContext, now: Timestamp) -> Result<ReminderSummary, JobError> {
    let date = notifications::reminder_target_date(now);
    let recipients = RegistrationRepo::reminder_recipients(&ctx.pool, date).await?;

    let mut summary = ReminderSummary {
        reminder_date: Some(date),
        ..Default::default()
    };

    for (event_id, group) in group_by_event(&recipients) {
        if !ReminderRepo::claim(&ctx.pool, event_id, date).await? {
            tracing::debug!(event_id, %date, "Reminders already sent, skipping event");
            summary.skipped_events += 1;
            continue;
        }

        let mut sent = 0;
        for recipient in group {
            let email = notifications::event_reminder(
                &recipient.username,
                &recipient.event_title,
                recipient.start_time,
            );
            let to = [recipient.email.clone()];
            match ctx
                .mailer
                .send(&email.subject, &email.body, &ctx.from_address, &to)
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(
                        event_id,
                        user_id = recipient.user_id,
                        error = %e,
                        "Failed to send event reminder"
                    );
                }
            }
        }

        ReminderRepo::mark_sent(&ctx.pool, event_id, date, recipient_count(sent)).await?;
        summary.events += 1;
        summary.sent += sent;
        tracing::info!(event_id, sent, total = group.len(), "Event reminders sent");
    }

    Ok(summary)
}
