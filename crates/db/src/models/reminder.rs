//! Reminder dedupe ledger model.

use chrono::NaiveDate;
use eventreg_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reminder_deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReminderDelivery {
    pub event_id: DbId,
    pub reminder_date: NaiveDate,
    pub claimed_at: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub recipient_count: i32,
}
