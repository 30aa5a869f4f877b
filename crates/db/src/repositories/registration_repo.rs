//! Repository for the `registrations` table.
//!
//! The registered count of an event is never stored; every method that needs
//! it counts rows at call time.

use chrono::NaiveDate;
use eventreg_core::capacity::CapacityStatus;
use eventreg_core::roles::ROLE_ATTENDEE;
use eventreg_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::is_unique_violation;
use crate::models::registration::{
    GuardedInsert, Registration, RegistrationWithEvent, ReminderRecipient, ReportEntry,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, event_id, registration_time, checked_in";

/// Unique constraint on `(user_id, event_id)`.
pub const UQ_USER_EVENT: &str = "uq_registrations_user_event";

/// Provides the capacity ledger and registration lifecycle queries.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Number of registrations currently held for an event.
    pub async fn count_for_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// Capacity snapshot for an event, or `None` if the event does not exist.
    pub async fn capacity_status(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Option<CapacityStatus>, sqlx::Error> {
        let row: Option<(i32, i64)> = sqlx::query_as(
            "SELECT e.capacity, \
                    (SELECT COUNT(*) FROM registrations r WHERE r.event_id = e.id) \
             FROM events e WHERE e.id = $1",
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(cap, count)| CapacityStatus::new(cap, count)))
    }

    /// Find the registration for a (user, event) pair.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2");
        sqlx::query_as::<_, Registration>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically check capacity and insert a registration.
    ///
    /// Runs in one transaction that first locks the event row with
    /// `SELECT ... FOR UPDATE`. Every concurrent registration for the same
    /// event queues on that lock, so the duplicate check, the count and the
    /// insert see a consistent ledger and the event can never be overbooked.
    /// The `uq_registrations_user_event` constraint backs up the duplicate
    /// check.
    pub async fn insert_guarded(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<GuardedInsert, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event_capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(event_capacity) = event_capacity else {
            return Ok(GuardedInsert::EventMissing);
        };

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Ok(GuardedInsert::Duplicate);
        }

        let registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
        let status = CapacityStatus::new(event_capacity, registered);
        if !status.has_capacity() {
            return Ok(GuardedInsert::Full(status));
        }

        let query = format!(
            "INSERT INTO registrations (user_id, event_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Registration>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await;

        let registration = match inserted {
            Ok(registration) => registration,
            Err(e) if is_unique_violation(&e, UQ_USER_EVENT) => {
                return Ok(GuardedInsert::Duplicate);
            }
            Err(e) => return Err(e),
        };

        tx.commit().await?;
        Ok(GuardedInsert::Inserted(registration))
    }

    /// Flip `checked_in` to true if it is currently false.
    ///
    /// Returns the updated row, or `None` when there is no registration or it
    /// was already checked in. Concurrent calls yield exactly one `Some`.
    pub async fn mark_checked_in(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE registrations SET checked_in = TRUE \
             WHERE user_id = $1 AND event_id = $2 AND checked_in = FALSE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a registration, but only while its event has not started at `now`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_before_start(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM registrations r USING events e \
             WHERE r.event_id = e.id \
               AND r.user_id = $1 AND r.event_id = $2 \
               AND e.start_time > $3",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// An attendee's registrations with event titles, soonest event first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RegistrationWithEvent>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationWithEvent>(
            "SELECT r.id, r.user_id, r.event_id, e.title AS event_title, \
                    e.start_time AS event_start_time, r.registration_time, r.checked_in \
             FROM registrations r \
             JOIN events e ON e.id = r.event_id \
             WHERE r.user_id = $1 \
             ORDER BY e.start_time, r.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Report rows for an event: attendee registrations only, in insertion order.
    pub async fn report_entries(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<ReportEntry>, sqlx::Error> {
        sqlx::query_as::<_, ReportEntry>(
            "SELECT u.id AS user_id, u.username, r.registration_time, r.checked_in \
             FROM registrations r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.event_id = $1 AND u.role = $2 \
             ORDER BY r.id",
        )
        .bind(event_id)
        .bind(ROLE_ATTENDEE)
        .fetch_all(pool)
        .await
    }

    /// Every registration whose event starts on `date` (UTC calendar date).
    ///
    /// Ordered by event then insertion so recipients of one event are contiguous.
    pub async fn reminder_recipients(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<ReminderRecipient>, sqlx::Error> {
        sqlx::query_as::<_, ReminderRecipient>(
            "SELECT r.id AS registration_id, e.id AS event_id, e.title AS event_title, \
                    e.start_time, u.id AS user_id, u.username, u.email \
             FROM registrations r \
             JOIN events e ON e.id = r.event_id \
             JOIN users u ON u.id = r.user_id \
             WHERE (e.start_time AT TIME ZONE 'UTC')::date = $1 \
             ORDER BY e.id, r.id",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }
}
