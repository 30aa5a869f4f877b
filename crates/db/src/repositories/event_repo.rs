//! Repository for the `events` table.

use eventreg_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, EventUpdate, EventWithAvailability};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, location, start_time, end_time, capacity, \
                       organizer_id, created_at, updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event owned by `organizer_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organizer_id: DbId,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (title, description, location, start_time, end_time, capacity, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.capacity)
            .bind(organizer_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the events owned by one organizer, soonest first.
    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: DbId,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY start_time, id"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await
    }

    /// List every event that still has at least one free seat, soonest first.
    ///
    /// `available_capacity` is computed from a live count of registrations.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<EventWithAvailability>, sqlx::Error> {
        sqlx::query_as::<_, EventWithAvailability>(
            "SELECT e.id, e.title, e.description, e.location, e.start_time, e.end_time, \
                    e.capacity, e.organizer_id, e.created_at, e.updated_at, \
                    e.capacity - COUNT(r.id) AS available_capacity \
             FROM events e \
             LEFT JOIN registrations r ON r.event_id = e.id \
             GROUP BY e.id \
             HAVING e.capacity - COUNT(r.id) > 0 \
             ORDER BY e.start_time, e.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Overwrite the editable fields of an event with an already-merged row.
    ///
    /// Takes the same event row lock as `RegistrationRepo::insert_guarded`, so
    /// a capacity reduction and a concurrent registration cannot both succeed
    /// past the new limit. Capacity may not drop below the live registration
    /// count.
    pub async fn update(pool: &PgPool, event: &Event) -> Result<EventUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM events WHERE id = $1 FOR UPDATE")
                .bind(event.id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(EventUpdate::Missing);
        }

        let registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event.id)
                .fetch_one(&mut *tx)
                .await?;
        if i64::from(event.capacity) < registered {
            return Ok(EventUpdate::BelowRegistered { registered });
        }

        let query = format!(
            "UPDATE events SET
                title = $2,
                description = $3,
                location = $4,
                start_time = $5,
                end_time = $6,
                capacity = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Event>(&query)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.capacity)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EventUpdate::Updated(updated))
    }

    /// Delete an event and, by cascade, its registrations.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
