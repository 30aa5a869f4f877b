use crate::types::DbId;

/// Domain error taxonomy shared by every crate in the workspace.
///
/// The registration-specific variants map one-to-one onto the workflow's
/// failure modes so the HTTP layer can give each its own status and code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("You are already registered for this event.")]
    DuplicateRegistration,

    #[error("This event is full.")]
    EventFull,

    #[error("You are not registered for this event.")]
    NotRegistered,

    #[error("You are already checked in.")]
    AlreadyCheckedIn,

    #[error("You can only cancel registration for future events.")]
    EventAlreadyStarted,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
