//! Validation rules for event input.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of an event title.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of an event location.
pub const MAX_LOCATION_LEN: usize = 255;

/// Validate a title: non-blank and at most [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Event title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Event title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a location: at most [`MAX_LOCATION_LEN`] characters.
pub fn validate_location(location: &str) -> Result<(), CoreError> {
    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(CoreError::Validation(format!(
            "Event location must be at most {MAX_LOCATION_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate the time window: `start` must be strictly before `end`.
pub fn validate_window(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::Validation(
            "Event start_time must be before end_time".into(),
        ));
    }
    Ok(())
}

/// Validate a capacity: must be non-negative.
pub fn validate_capacity(capacity: i32) -> Result<(), CoreError> {
    if capacity < 0 {
        return Err(CoreError::Validation(
            "Event capacity must not be negative".into(),
        ));
    }
    Ok(())
}

/// Validate every field of a fully-resolved event.
///
/// Update handlers merge the patch over the stored row first and then call
/// this, so a patch that moves only `start_time` is still checked against the
/// stored `end_time`.
pub fn validate_event(
    title: &str,
    location: &str,
    start: Timestamp,
    end: Timestamp,
    capacity: i32,
) -> Result<(), CoreError> {
    validate_title(title)?;
    validate_location(location)?;
    validate_window(start, end)?;
    validate_capacity(capacity)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn blank_title_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("RustConf").is_ok());
    }

    #[test]
    fn overlong_title_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_title(&long).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn window_must_be_ordered() {
        let start = Utc::now();
        assert!(validate_window(start, start + Duration::hours(1)).is_ok());
        assert!(validate_window(start, start).is_err());
        assert!(validate_window(start, start - Duration::hours(1)).is_err());
    }

    #[test]
    fn capacity_zero_is_valid_negative_is_not() {
        assert!(validate_capacity(0).is_ok());
        assert!(validate_capacity(-1).is_err());
    }

    #[test]
    fn validate_event_checks_all_fields() {
        let start = Utc::now();
        let end = start + Duration::hours(3);
        assert!(validate_event("Meetup", "Hall A", start, end, 10).is_ok());
        assert!(validate_event("Meetup", "Hall A", end, start, 10).is_err());
        assert!(validate_event("Meetup", "Hall A", start, end, -5).is_err());
    }
}
