pub mod auth;
pub mod events;
pub mod health;
pub mod registrations;
pub mod reports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   signup (public)
/// /auth/login                                      login (public)
///
/// /events                                          list own, create (organizer)
/// /events/available                                events with seats left (attendee)
/// /events/{id}                                     get, update, delete (owner)
/// /events/{id}/register                            register (attendee)
/// /events/{id}/check-in                            check in (attendee)
/// /events/{id}/cancel-registration                 cancel (attendee)
/// /events/{id}/capacity-status                     live capacity (owner)
/// /events/{id}/registrations-report                queue CSV report (owner)
///
/// /registrations                                   own registrations (attendee)
///
/// /report-status/{job_id}                          poll report job (requester)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/registrations", registrations::router())
        .nest("/report-status", reports::router())
}
