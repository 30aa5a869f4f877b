//! Email content and reminder-window date math.
//!
//! The reminder window compares calendar dates (UTC), not 24-hour offsets:
//! an event at 00:30 tomorrow and one at 23:30 tomorrow both get their
//! reminder on today's run.

use chrono::{Days, NaiveDate};

use crate::types::Timestamp;

/// An outgoing plain-text email, before a sender address is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Reminder window
// ---------------------------------------------------------------------------

/// The calendar date whose events get a reminder on a run at `now`.
pub fn reminder_target_date(now: Timestamp) -> NaiveDate {
    let today = now.date_naive();
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

// ---------------------------------------------------------------------------
// Message bodies
// ---------------------------------------------------------------------------

/// Confirmation sent after a successful registration.
pub fn registration_confirmation(event_name: &str) -> EmailContent {
    EmailContent {
        subject: format!("Registration Confirmation for {event_name}"),
        body: format!("Thank you for registering for {event_name}."),
    }
}

/// Reminder sent the day before an event starts.
pub fn event_reminder(username: &str, event_title: &str, start_time: Timestamp) -> EmailContent {
    EmailContent {
        subject: format!("Reminder: {event_title} is tomorrow!"),
        body: format!(
            "Hello {username},\n\n\
             This is a reminder that the event '{event_title}' will take place tomorrow at {}.\n\n\
             Best regards,\nYour Event Management Team",
            start_time.format("%Y-%m-%d %H:%M %Z")
        ),
    }
}
