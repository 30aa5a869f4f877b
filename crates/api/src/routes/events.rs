//! Route definitions for the `/events` resource and its registration actions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{events, registrations, reports};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                            -> list_mine (organizer)
/// POST   /                            -> create (organizer)
/// GET    /available                   -> list_available (attendee)
/// GET    /{id}                        -> get_by_id (owner)
/// PUT    /{id}                        -> update (owner)
/// DELETE /{id}                        -> delete (owner)
/// POST   /{id}/register               -> register (attendee)
/// POST   /{id}/check-in               -> check_in (attendee)
/// POST   /{id}/cancel-registration    -> cancel (attendee)
/// GET    /{id}/capacity-status        -> capacity_status (owner)
/// GET    /{id}/registrations-report   -> request report job (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_mine).post(events::create))
        .route("/available", get(events::list_available))
        .route(
            "/{id}",
            get(events::get_by_id)
                .put(events::update)
                .delete(events::delete),
        )
        .route("/{id}/register", post(registrations::register))
        .route("/{id}/check-in", post(registrations::check_in))
        .route("/{id}/cancel-registration", post(registrations::cancel))
        .route("/{id}/capacity-status", get(events::capacity_status))
        .route("/{id}/registrations-report", get(reports::request))
}
