//! Registration state machine for a single (user, event) pair.
//!
//! ```text
//! Unregistered --register--> Registered --check_in--> CheckedIn
//!      ^                         |                        |
//!      +------cancel (before event start) ----------------+
//! ```
//!
//! Cancelling deletes the registration row, so the pair is back to
//! `Unregistered` and may register again. Registering is decided by
//! `RegistrationRepo::insert_guarded` under the event row lock.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Where a (user, event) pair currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    Registered,
    CheckedIn,
}

impl RegistrationState {
    /// Derive the state from the `checked_in` column of an optional row.
    pub fn from_checked_in(checked_in: Option<bool>) -> Self {
        match checked_in {
            None => RegistrationState::Unregistered,
            Some(false) => RegistrationState::Registered,
            Some(true) => RegistrationState::CheckedIn,
        }
    }
}

/// `Registered -> CheckedIn`.
pub fn validate_check_in(state: RegistrationState) -> Result<(), CoreError> {
    match state {
        RegistrationState::Unregistered => Err(CoreError::NotRegistered),
        RegistrationState::Registered => Ok(()),
        RegistrationState::CheckedIn => Err(CoreError::AlreadyCheckedIn),
    }
}

/// `Registered | CheckedIn -> Unregistered`, only while the event has not started.
///
/// An event whose start time equals `now` has started.
pub fn validate_cancel(
    state: RegistrationState,
    event_start: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if state == RegistrationState::Unregistered {
        return Err(CoreError::NotRegistered);
    }
    if event_start <= now {
        return Err(CoreError::EventAlreadyStarted);
    }
    Ok(())
}
