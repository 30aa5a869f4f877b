//! Registration workflow: every operation an organizer or attendee can perform.
//!
//! Each function authorizes the caller through [`authorize`] first, then
//! applies the state rules from `eventreg_core::registration` against the
//! database. Handlers stay thin wrappers around these.

use eventreg_core::capacity::CapacityStatus;
use eventreg_core::error::CoreError;
use eventreg_core::event_rules;
use eventreg_core::jobs::{
    ConfirmationParams, ReportParams, JOB_GENERATE_REGISTRATION_REPORT,
    JOB_SEND_REGISTRATION_CONFIRMATION,
};
use eventreg_core::registration::{self, RegistrationState};
use eventreg_core::roles::{authorize, Action, Actor};
use eventreg_core::types::{DbId, Timestamp};
use eventreg_db::models::event::{
    CreateEvent, Event, EventUpdate, EventWithAvailability, UpdateEvent,
};
use eventreg_db::models::job::{Job, JobStatusView};
use eventreg_db::models::registration::{GuardedInsert, Registration, RegistrationWithEvent};
use eventreg_db::repositories::{EventRepo, JobRepo, RegistrationRepo, UserRepo};
use eventreg_db::DbPool;

use crate::error::{AppError, AppResult};

async fn find_event(pool: &DbPool, event_id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))
}

/// Load an event and check the caller may perform `action` on it.
async fn owned_event(
    pool: &DbPool,
    actor: &Actor,
    action: Action,
    event_id: DbId,
) -> AppResult<Event> {
    // Role is checked before the lookup: wrong-role callers never see a 404.
    authorize(actor, action, None)?;
    let event = find_event(pool, event_id).await?;
    authorize(actor, action, Some(event.organizer_id))?;
    Ok(event)
}

// ---------------------------------------------------------------------------
// Attendee operations
// ---------------------------------------------------------------------------

/// Register the caller for an event.
///
/// The capacity check and insert are one atomic step; a confirmation email
/// job is enqueued afterwards and its failure never undoes the registration.
pub async fn register(pool: &DbPool, actor: &Actor, event_id: DbId) -> AppResult<Registration> {
    authorize(actor, Action::Register, None)?;
    let event = find_event(pool, event_id).await?;

    let outcome = RegistrationRepo::insert_guarded(pool, actor.user_id, event.id).await?;
    let registration = match outcome {
        GuardedInsert::Inserted(registration) => registration,
        GuardedInsert::Duplicate => return Err(CoreError::DuplicateRegistration.into()),
        GuardedInsert::Full(status) => {
            tracing::info!(
                event_id,
                user_id = actor.user_id,
                capacity = status.total,
                "Registration rejected, event full"
            );
            return Err(CoreError::EventFull.into());
        }
        GuardedInsert::EventMissing => {
            return Err(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            }
            .into())
        }
    };

    tracing::info!(event_id, user_id = actor.user_id, "Registration created");
    enqueue_confirmation(pool, actor.user_id, &event).await;
    Ok(registration)
}

/// Fire-and-forget: enqueue the confirmation email, logging any failure.
async fn enqueue_confirmation(pool: &DbPool, user_id: DbId, event: &Event) {
    let user = match UserRepo::find_by_id(pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id, "Registrant vanished before confirmation could be queued");
            return;
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "Failed to load registrant for confirmation");
            return;
        }
    };

    let params = ConfirmationParams {
        email: user.email,
        event_name: event.title.clone(),
    };
    let params = match serde_json::to_value(&params) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode confirmation parameters");
            return;
        }
    };

    match JobRepo::enqueue(pool, JOB_SEND_REGISTRATION_CONFIRMATION, &params, Some(user_id)).await {
        Ok(job) => tracing::info!(
            job_id = job.id,
            event_id = event.id,
            user_id,
            "Confirmation email queued"
        ),
        Err(e) => tracing::error!(
            event_id = event.id,
            user_id,
            error = %e,
            "Failed to queue confirmation email"
        ),
    }
}

/// Mark the caller as checked in. Only one of several concurrent calls succeeds.
pub async fn check_in(pool: &DbPool, actor: &Actor, event_id: DbId) -> AppResult<Registration> {
    authorize(actor, Action::CheckIn, None)?;
    find_event(pool, event_id).await?;

    for _ in 0..2 {
        let updated = RegistrationRepo::mark_checked_in(pool, actor.user_id, event_id).await?;
        if let Some(registration) = updated {
            tracing::info!(event_id, user_id = actor.user_id, "Attendee checked in");
            return Ok(registration);
        }

        // The conditional update matched nothing: work out why.
        let existing = RegistrationRepo::find(pool, actor.user_id, event_id).await?;
        let state = RegistrationState::from_checked_in(existing.map(|r| r.checked_in));
        registration::validate_check_in(state)?;
        // Re-read shows an unchecked registration (re-registered in between): retry once.
    }

    Err(CoreError::Conflict("Registration changed concurrently, please retry.".into()).into())
}

/// Cancel the caller's registration, allowed only before the event starts.
pub async fn cancel_registration(
    pool: &DbPool,
    actor: &Actor,
    event_id: DbId,
    now: Timestamp,
) -> AppResult<()> {
    authorize(actor, Action::CancelRegistration, None)?;
    let event = find_event(pool, event_id).await?;

    for _ in 0..2 {
        if RegistrationRepo::delete_before_start(pool, actor.user_id, event_id, now).await? {
            tracing::info!(event_id, user_id = actor.user_id, "Registration cancelled");
            return Ok(());
        }

        let existing = RegistrationRepo::find(pool, actor.user_id, event_id).await?;
        let state = RegistrationState::from_checked_in(existing.map(|r| r.checked_in));
        registration::validate_cancel(state, event.start_time, now)?;
        // Registration reappeared between the delete and the lookup: retry once.
    }

    Err(CoreError::Conflict("Registration changed concurrently, please retry.".into()).into())
}

/// The caller's registrations with event titles.
pub async fn list_my_registrations(
    pool: &DbPool,
    actor: &Actor,
) -> AppResult<Vec<RegistrationWithEvent>> {
    authorize(actor, Action::ListOwnRegistrations, None)?;
    Ok(RegistrationRepo::list_for_user(pool, actor.user_id).await?)
}

/// Events that still have at least one free seat.
pub async fn list_available_events(
    pool: &DbPool,
    actor: &Actor,
) -> AppResult<Vec<EventWithAvailability>> {
    authorize(actor, Action::ListAvailableEvents, None)?;
    Ok(EventRepo::list_available(pool).await?)
}

// ---------------------------------------------------------------------------
// Organizer operations
// ---------------------------------------------------------------------------

pub async fn create_event(pool: &DbPool, actor: &Actor, input: &CreateEvent) -> AppResult<Event> {
    authorize(actor, Action::CreateEvent, None)?;
    event_rules::validate_event(
        &input.title,
        &input.location,
        input.start_time,
        input.end_time,
        input.capacity,
    )?;

    let event = EventRepo::create(pool, actor.user_id, input).await?;
    tracing::info!(event_id = event.id, organizer_id = actor.user_id, "Event created");
    Ok(event)
}

pub async fn list_my_events(pool: &DbPool, actor: &Actor) -> AppResult<Vec<Event>> {
    authorize(actor, Action::ListOwnEvents, None)?;
    Ok(EventRepo::list_by_organizer(pool, actor.user_id).await?)
}

pub async fn get_event(pool: &DbPool, actor: &Actor, event_id: DbId) -> AppResult<Event> {
    owned_event(pool, actor, Action::ViewEvent, event_id).await
}

/// Apply a partial update. The merged event is validated as a whole, and
/// capacity may not drop below the current registration count.
pub async fn update_event(
    pool: &DbPool,
    actor: &Actor,
    event_id: DbId,
    patch: &UpdateEvent,
) -> AppResult<Event> {
    let current = owned_event(pool, actor, Action::UpdateEvent, event_id).await?;
    let merged = patch.merged_onto(&current);
    event_rules::validate_event(
        &merged.title,
        &merged.location,
        merged.start_time,
        merged.end_time,
        merged.capacity,
    )?;

    match EventRepo::update(pool, &merged).await? {
        EventUpdate::Updated(event) => {
            tracing::info!(event_id, organizer_id = actor.user_id, "Event updated");
            Ok(event)
        }
        EventUpdate::Missing => Err(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }
        .into()),
        EventUpdate::BelowRegistered { registered } => Err(CoreError::Validation(format!(
            "Capacity cannot be lower than the {registered} existing registrations."
        ))
        .into()),
    }
}

pub async fn delete_event(pool: &DbPool, actor: &Actor, event_id: DbId) -> AppResult<()> {
    owned_event(pool, actor, Action::DeleteEvent, event_id).await?;
    if !EventRepo::delete(pool, event_id).await? {
        return Err(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }
        .into());
    }
    tracing::info!(event_id, organizer_id = actor.user_id, "Event deleted");
    Ok(())
}

/// Live `{total, registered, remaining}` for one of the caller's events.
pub async fn capacity_status(
    pool: &DbPool,
    actor: &Actor,
    event_id: DbId,
) -> AppResult<CapacityStatus> {
    owned_event(pool, actor, Action::ViewCapacity, event_id).await?;
    RegistrationRepo::capacity_status(pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))
}

/// Enqueue the CSV report job for one of the caller's events.
pub async fn request_report(pool: &DbPool, actor: &Actor, event_id: DbId) -> AppResult<Job> {
    let event = owned_event(pool, actor, Action::ViewReport, event_id).await?;
    let params = serde_json::to_value(ReportParams { event_id: event.id })
        .map_err(|e| AppError::InternalError(format!("Failed to encode report parameters: {e}")))?;

    let job = JobRepo::enqueue(pool, JOB_GENERATE_REGISTRATION_REPORT, &params, Some(actor.user_id))
        .await?;
    tracing::info!(job_id = job.id, event_id, organizer_id = actor.user_id, "Report job queued");
    Ok(job)
}

/// Poll a report job. Only the organizer who requested it may see it.
pub async fn job_status(pool: &DbPool, actor: &Actor, job_id: DbId) -> AppResult<JobStatusView> {
    authorize(actor, Action::ViewReport, None)?;
    JobRepo::status(pool, job_id, JOB_GENERATE_REGISTRATION_REPORT, actor.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))
}
