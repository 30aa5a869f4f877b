//! Repository for the `reminder_deliveries` dedupe ledger.

use chrono::NaiveDate;
use eventreg_core::types::DbId;
use sqlx::PgPool;

use crate::models::reminder::ReminderDelivery;

/// Records which (event, date) reminders have been sent.
pub struct ReminderRepo;

impl ReminderRepo {
    /// Claim the dedupe key for an event's reminder on `date`.
    ///
    /// Returns `true` for exactly one caller per key; every later caller (a
    /// second run the same day, a redelivered job) gets `false` and must not
    /// send.
    pub async fn claim(
        pool: &PgPool,
        event_id: DbId,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO reminder_deliveries (event_id, reminder_date) VALUES ($1, $2) \
             ON CONFLICT (event_id, reminder_date) DO NOTHING",
        )
        .bind(event_id)
        .bind(date)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Stamp a claimed key with the send time and how many emails went out.
    pub async fn mark_sent(
        pool: &PgPool,
        event_id: DbId,
        date: NaiveDate,
        recipient_count: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE reminder_deliveries SET sent_at = NOW(), recipient_count = $3 \
             WHERE event_id = $1 AND reminder_date = $2",
        )
        .bind(event_id)
        .bind(date)
        .bind(recipient_count)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Look up the ledger row for one key.
    pub async fn find(
        pool: &PgPool,
        event_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<ReminderDelivery>, sqlx::Error> {
        sqlx::query_as::<_, ReminderDelivery>(
            "SELECT event_id, reminder_date, claimed_at, sent_at, recipient_count \
             FROM reminder_deliveries WHERE event_id = $1 AND reminder_date = $2",
        )
        .bind(event_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }
}
