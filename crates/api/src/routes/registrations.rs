use axum::routing::get;
use axum::Router;

use crate::handlers::registrations;
use crate::state::AppState;

/// Routes mounted at `/registrations`.
///
/// ```text
/// GET / -> list_mine (attendee)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(registrations::list_mine))
}
