//! User roles and the single authorization policy every operation goes through.
//!
//! Roles are a closed set. Handlers never compare role strings; they ask
//! [`authorize`] whether an [`Actor`] may perform an [`Action`], optionally
//! against the owner of the event being touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Stored name of the organizer role. Must match the `users.role` CHECK constraint.
pub const ROLE_ORGANIZER: &str = "Organizer";

/// Stored name of the attendee role. Must match the `users.role` CHECK constraint.
pub const ROLE_ATTENDEE: &str = "Attendee";

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The role a user holds for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Organizer,
    Attendee,
}

impl Role {
    /// Name as stored in the database and embedded in access tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Organizer => ROLE_ORGANIZER,
            Role::Attendee => ROLE_ATTENDEE,
        }
    }

    /// Parse a stored role name. Matching is exact.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_ORGANIZER => Ok(Role::Organizer),
            ROLE_ATTENDEE => Ok(Role::Attendee),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'. Must be one of: {ROLE_ORGANIZER}, {ROLE_ATTENDEE}"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s)
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::from_name(&value)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Every guarded operation in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEvent,
    ListOwnEvents,
    ViewEvent,
    UpdateEvent,
    DeleteEvent,
    ViewReport,
    ViewCapacity,
    Register,
    CheckIn,
    CancelRegistration,
    ListOwnRegistrations,
    ListAvailableEvents,
}

impl Action {
    /// The role an actor must hold to perform this action.
    pub fn required_role(self) -> Role {
        match self {
            Action::CreateEvent
            | Action::ListOwnEvents
            | Action::ViewEvent
            | Action::UpdateEvent
            | Action::DeleteEvent
            | Action::ViewReport
            | Action::ViewCapacity => Role::Organizer,
            Action::Register
            | Action::CheckIn
            | Action::CancelRegistration
            | Action::ListOwnRegistrations
            | Action::ListAvailableEvents => Role::Attendee,
        }
    }

    /// Whether the actor must also own the event the action targets.
    pub fn requires_ownership(self) -> bool {
        matches!(
            self,
            Action::ViewEvent
                | Action::UpdateEvent
                | Action::DeleteEvent
                | Action::ViewReport
                | Action::ViewCapacity
        )
    }

    fn role_denied_message(self) -> &'static str {
        match self {
            Action::CreateEvent => "Only organizers can create events.",
            Action::UpdateEvent => "Only organizers can update events.",
            Action::DeleteEvent => "Only organizers can delete events.",
            Action::ListOwnEvents | Action::ViewEvent => {
                "You do not have permission to view this endpoint."
            }
            Action::ViewReport | Action::ViewCapacity => "Organizer role required.",
            Action::Register => "Only attendees can register for events.",
            Action::CheckIn => "Only attendees can check-in for events.",
            Action::CancelRegistration => "Only attendees can cancel event registration.",
            Action::ListOwnRegistrations => "Only attendees can view their registrations.",
            Action::ListAvailableEvents => "Only attendees can browse available events.",
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Decide whether `actor` may perform `action`.
///
/// `event_owner` is the organizer id of the targeted event, when there is one.
/// Ownership is only enforced for actions whose [`Action::requires_ownership`]
/// is true; passing `None` for such an action checks the role alone.
pub fn authorize(
    actor: &Actor,
    action: Action,
    event_owner: Option<DbId>,
) -> Result<(), CoreError> {
    if actor.role != action.required_role() {
        return Err(CoreError::Forbidden(action.role_denied_message().into()));
    }

    if action.requires_ownership() {
        if let Some(owner) = event_owner {
            if owner != actor.user_id {
                return Err(CoreError::Forbidden(
                    "You are not the organizer of this event.".into(),
                ));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
