//! Registration confirmation email.

use eventreg_core::jobs::ConfirmationParams;
use eventreg_core::notifications;

use super::JobError;
use crate::context::JobContext;

/// Send the confirmation to the registrant. Delivery errors fail the job.
pub async fn run(
    ctx: &JobContext,
    params: &ConfirmationParams,
) -> Result<serde_json::Value, JobError> {
    let email = notifications::registration_confirmation(&params.event_name);
    let to = [params.email.clone()];

    ctx.mailer
        .send(&email.subject, &email.body, &ctx.from_address, &to)
        .await?;

    tracing::info!(
        to = %params.email,
        event = %params.event_name,
        "Registration confirmation sent"
    );
    Ok(serde_json::json!({ "sent_to": params.email }))
}
