//! CSV registration report generation.

use eventreg_core::jobs::ReportParams;
use eventreg_core::report::{
    self, ReportOutcome, ReportRow, REPORT_EVENT_NOT_FOUND, REPORT_SUCCESS_MESSAGE,
};
use eventreg_db::repositories::{EventRepo, RegistrationRepo};

use super::JobError;
use crate::context::JobContext;

/// Build the attendee report for an event and persist it in the blob store.
///
/// A missing event is not an error: the job completes with a
/// [`ReportOutcome::Failed`] result so the poller sees why.
pub async fn run(ctx: &JobContext, params: ReportParams) -> Result<ReportOutcome, JobError> {
    let Some(event) = EventRepo::find_by_id(&ctx.pool, params.event_id).await? else {
        tracing::warn!(event_id = params.event_id, "Report requested for missing event");
        return Ok(ReportOutcome::Failed {
            error: REPORT_EVENT_NOT_FOUND.to_string(),
        });
    };

    let rows: Vec<ReportRow> = RegistrationRepo::report_entries(&ctx.pool, event.id)
        .await?
        .into_iter()
        .map(ReportRow::from)
        .collect();
    let csv = report::build_csv(&rows);

    let saved = ctx
        .store
        .save(&report::report_path(&event.title), csv.as_bytes())
        .await?;
    let file_name = saved
        .rsplit_once('/')
        .map_or(saved.as_str(), |(_, name)| name)
        .to_string();

    tracing::info!(
        event_id = event.id,
        rows = rows.len(),
        path = %saved,
        "Registration report generated"
    );

    Ok(ReportOutcome::Generated {
        message: REPORT_SUCCESS_MESSAGE.to_string(),
        file_name,
        file_path: saved,
    })
}
