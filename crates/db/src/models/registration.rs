//! Registration entity model and the read projections built on it.

use eventreg_core::capacity::CapacityStatus;
use eventreg_core::report::ReportRow;
use eventreg_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub registration_time: Timestamp,
    pub checked_in: bool,
}

/// A registration joined with its event title, for the attendee's own list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RegistrationWithEvent {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub event_title: String,
    pub event_start_time: Timestamp,
    pub registration_time: Timestamp,
    pub checked_in: bool,
}

/// One attendee row of the CSV report.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntry {
    pub user_id: DbId,
    pub username: String,
    pub registration_time: Timestamp,
    pub checked_in: bool,
}

impl From<ReportEntry> for ReportRow {
    fn from(entry: ReportEntry) -> Self {
        ReportRow {
            user_id: entry.user_id,
            username: entry.username,
            registration_time: entry.registration_time,
            checked_in: entry.checked_in,
        }
    }
}

/// A registrant who should receive the day-before reminder.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderRecipient {
    pub registration_id: DbId,
    pub event_id: DbId,
    pub event_title: String,
    pub start_time: Timestamp,
    pub user_id: DbId,
    pub username: String,
    pub email: String,
}

/// Outcome of the guarded check-and-insert.
#[derive(Debug, Clone)]
pub enum GuardedInsert {
    /// The registration was created.
    Inserted(Registration),
    /// The user already holds a registration for the event.
    Duplicate,
    /// The event had no remaining capacity; carries the snapshot that was checked.
    Full(CapacityStatus),
    /// The event does not exist (or was deleted before the lock was taken).
    EventMissing,
}
