//! Handlers for attendee registration actions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use eventreg_core::types::DbId;
use eventreg_db::models::registration::RegistrationWithEvent;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::AppPath;
use crate::response::{DataResponse, DetailResponse};
use crate::state::AppState;
use crate::workflow;

/// POST /api/v1/events/{id}/register
pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<DbId>,
) -> AppResult<(StatusCode, Json<DetailResponse>)> {
    workflow::register(&state.pool, &user.actor(), event_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DetailResponse {
            detail: "Successfully registered for the event.",
        }),
    ))
}

/// POST /api/v1/events/{id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<DbId>,
) -> AppResult<Json<DetailResponse>> {
    workflow::check_in(&state.pool, &user.actor(), event_id).await?;
    Ok(Json(DetailResponse {
        detail: "Successfully checked in.",
    }))
}

/// POST /api/v1/events/{id}/cancel-registration
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<DbId>,
) -> AppResult<Json<DetailResponse>> {
    workflow::cancel_registration(&state.pool, &user.actor(), event_id, Utc::now()).await?;
    Ok(Json(DetailResponse {
        detail: "Registration canceled successfully.",
    }))
}

/// GET /api/v1/registrations
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<RegistrationWithEvent>>>> {
    let registrations = workflow::list_my_registrations(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse {
        data: registrations,
    }))
}
