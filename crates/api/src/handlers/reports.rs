//! Handlers for asynchronous registration reports.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventreg_core::types::DbId;
use eventreg_db::models::job::JobStatusView;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::extract::AppPath;
use crate::state::AppState;
use crate::workflow;

/// Body of the 202 returned when a report is queued.
#[derive(Debug, Serialize)]
pub struct ReportQueued {
    pub task_id: DbId,
    pub detail: &'static str,
}

/// GET /api/v1/events/{id}/registrations-report
///
/// Queues the CSV report job and returns its id for polling.
pub async fn request(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<DbId>,
) -> AppResult<(StatusCode, Json<ReportQueued>)> {
    let job = workflow::request_report(&state.pool, &user.actor(), event_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ReportQueued {
            task_id: job.id,
            detail: "The registration report is being generated.",
        }),
    ))
}

/// GET /api/v1/report-status/{job_id}
///
/// 200 with the result once the job is done, 202 while it is pending.
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(job_id): AppPath<DbId>,
) -> AppResult<(StatusCode, Json<JobStatusView>)> {
    let view = workflow::job_status(&state.pool, &user.actor(), job_id).await?;
    let code = if view.result.is_some() {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };
    Ok((code, Json(view)))
}
