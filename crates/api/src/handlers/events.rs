//! Handlers for the `/events` resource.
//!
//! Organizers manage their own events; attendees browse those with seats left.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventreg_core::capacity::CapacityStatus;
use eventreg_core::types::DbId;
use eventreg_db::models::event::{CreateEvent, Event, EventWithAvailability, UpdateEvent};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;

/// Body of `GET /events/{id}/capacity-status`.
#[derive(Debug, Serialize)]
pub struct CapacityStatusResponse {
    pub total_capacity: i64,
    pub registered_count: i64,
    pub remaining_capacity: i64,
}

impl From<CapacityStatus> for CapacityStatusResponse {
    fn from(status: CapacityStatus) -> Self {
        Self {
            total_capacity: status.total,
            registered_count: status.registered,
            remaining_capacity: status.remaining,
        }
    }
}

/// POST /api/v1/events
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    let event = workflow::create_event(&state.pool, &user.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events
///
/// The caller's own events, soonest first.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events = workflow::list_my_events(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/available
pub async fn list_available(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<EventWithAvailability>>>> {
    let events = workflow::list_available_events(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = workflow::get_event(&state.pool, &user.actor(), id).await?;
    Ok(Json(DataResponse { data: event }))
}

/// PUT /api/v1/events/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = workflow::update_event(&state.pool, &user.actor(), id, &input).await?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    workflow::delete_event(&state.pool, &user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/events/{id}/capacity-status
pub async fn capacity_status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<CapacityStatusResponse>> {
    let status = workflow::capacity_status(&state.pool, &user.actor(), id).await?;
    Ok(Json(status.into()))
}
