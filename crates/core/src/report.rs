//! CSV attendance report construction.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Header row of every registration report.
pub const REPORT_HEADER: [&str; 4] = ["User ID", "Username", "Registration Time", "Checked In"];

/// Directory (within the blob store) that reports are written to.
pub const REPORT_DIR: &str = "reports";

/// Message returned by a successful report job.
pub const REPORT_SUCCESS_MESSAGE: &str = "CSV report generated successfully!";

/// Error returned by a report job whose event no longer exists.
pub const REPORT_EVENT_NOT_FOUND: &str = "Event not found.";

/// One attendee line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub user_id: DbId,
    pub username: String,
    pub registration_time: Timestamp,
    pub checked_in: bool,
}

/// Result payload of the report job, stored on the job row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportOutcome {
    Generated {
        message: String,
        file_name: String,
        file_path: String,
    },
    Failed {
        error: String,
    },
}

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| csv_escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the report document. Rows are written in the order given.
///
/// Lines end with `\r\n`, the CSV convention spreadsheet tools expect.
pub fn build_csv(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(REPORT_HEADER));
    out.push_str("\r\n");

    for row in rows {
        out.push_str(&csv_line([
            row.user_id.to_string(),
            row.username.clone(),
            row.registration_time.to_rfc3339(),
            if row.checked_in { "True" } else { "False" }.to_string(),
        ]));
        out.push_str("\r\n");
    }

    out
}

/// File name for an event's report: `{title}_registrations.csv`.
///
/// Path separators and control characters in the title are replaced with
/// `_` so the title can never escape [`REPORT_DIR`].
pub fn report_file_name(event_title: &str) -> String {
    let safe: String = event_title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = if safe.is_empty() || safe.chars().all(|c| c == '.') {
        "event".to_string()
    } else {
        safe
    };
    format!("{safe}_registrations.csv")
}

/// Blob-store path for an event's report: `reports/{title}_registrations.csv`.
pub fn report_path(event_title: &str) -> String {
    format!("{REPORT_DIR}/{}", report_file_name(event_title))
}
