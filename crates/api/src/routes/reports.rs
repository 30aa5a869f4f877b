use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/report-status`.
///
/// ```text
/// GET /{job_id} -> status (requesting organizer)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{job_id}", get(reports::status))
}
