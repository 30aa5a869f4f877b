//! Event entity model and DTOs.

use eventreg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub capacity: i32,
    pub organizer_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An event plus its remaining capacity, computed at query time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventWithAvailability {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub available_capacity: i64,
}

/// DTO for creating a new event. The organizer is always the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub capacity: i32,
}

/// DTO for updating an existing event. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub capacity: Option<i32>,
}

impl UpdateEvent {
    /// Apply this patch over `current`, returning the event as it would be stored.
    pub fn merged_onto(&self, current: &Event) -> Event {
        Event {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| current.location.clone()),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            capacity: self.capacity.unwrap_or(current.capacity),
            ..current.clone()
        }
    }
}

/// Outcome of `EventRepo::update`.
#[derive(Debug, Clone)]
pub enum EventUpdate {
    Updated(Event),
    /// The event does not exist.
    Missing,
    /// The new capacity is lower than the number of current registrations.
    BelowRegistered { registered: i64 },
}
