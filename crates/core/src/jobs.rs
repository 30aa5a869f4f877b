//! Background job names and their parameter payloads.
//!
//! Jobs are stored with a `job_type` string and a JSON `parameters` column.
//! The worker looks the type up in its handler table and deserializes the
//! matching payload struct below.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Send the "thanks for registering" email.
pub const JOB_SEND_REGISTRATION_CONFIRMATION: &str = "send_registration_confirmation";

/// Build and persist the CSV attendance report for one event.
pub const JOB_GENERATE_REGISTRATION_REPORT: &str = "generate_registration_report";

/// Email every registrant of tomorrow's events.
pub const JOB_SEND_DAILY_REMINDERS: &str = "send_daily_reminders";

/// Every job type the worker knows how to run.
pub const ALL_JOB_TYPES: &[&str] = &[
    JOB_SEND_REGISTRATION_CONFIRMATION,
    JOB_GENERATE_REGISTRATION_REPORT,
    JOB_SEND_DAILY_REMINDERS,
];

/// Parameters for [`JOB_SEND_REGISTRATION_CONFIRMATION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationParams {
    pub email: String,
    pub event_name: String,
}

/// Parameters for [`JOB_GENERATE_REGISTRATION_REPORT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParams {
    pub event_id: DbId,
}

/// Parameters for [`JOB_SEND_DAILY_REMINDERS`]. The run date is taken from the
/// clock when the job executes, so the payload is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemindersParams {}

/// Whether `job_type` names a job the worker can run.
pub fn is_known_job_type(job_type: &str) -> bool {
    ALL_JOB_TYPES.contains(&job_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_job_types() {
        assert!(is_known_job_type(JOB_GENERATE_REGISTRATION_REPORT));
        assert!(!is_known_job_type("debug_task"));
    }

    #[test]
    fn report_params_from_json() {
        let params: ReportParams =
            serde_json::from_value(serde_json::json!({ "event_id": 12 })).unwrap();
        assert_eq!(params.event_id, 12);
    }

    #[test]
    fn reminders_params_accept_empty_object() {
        let params: RemindersParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params, RemindersParams::default());
    }
}
