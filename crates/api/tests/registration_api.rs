//! HTTP-level integration tests for the event registration workflow.
//!
//! Covers organizer event management, attendee registration, check-in,
//! cancellation, capacity reporting and role enforcement.

mod common;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use chrono::{Duration, Utc};
use common::{
    body_json, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth, token_for,
};
use eventreg_core::jobs::{JOB_GENERATE_REGISTRATION_REPORT, JOB_SEND_REGISTRATION_CONFIRMATION};
use eventreg_core::roles::Role;
use eventreg_core::types::DbId;
use eventreg_db::models::event::CreateEvent;
use eventreg_db::models::user::CreateUser;
use eventreg_db::repositories::{EventRepo, JobRepo, RegistrationRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a user directly and return `(id, token)`.
async fn create_user(pool: &PgPool, username: &str, role: Role) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
        },
    )
    .await
    .expect("user creation should succeed");
    (user.id, token_for(user.id, role))
}

/// Create an event through the API and return its id.
async fn create_event(pool: &PgPool, token: &str, capacity: i32) -> DbId {
    let start = Utc::now() + Duration::days(3);
    let body = json!({
        "title": "Rust meetup",
        "description": "Talks and pizza",
        "location": "Room 101",
        "start_time": start,
        "end_time": start + Duration::hours(2),
        "capacity": capacity,
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/events", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn register(pool: &PgPool, event_id: DbId, token: &str) -> Response<Body> {
    post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/register"),
        token,
    )
    .await
}

// ---------------------------------------------------------------------------
// Event management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organizer_manages_own_events(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 20).await;

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/events", &org).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}"),
        json!({ "title": "Rust meetup (moved)", "capacity": 25 }),
        &org,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Rust meetup (moved)");
    assert_eq!(json["data"]["capacity"], 25);
    assert_eq!(json["data"]["location"], "Room 101");

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}"),
        &org,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(EventRepo::find_by_id(&pool, event_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_event_rejects_inverted_window(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let start = Utc::now() + Duration::days(1);
    let body = json!({
        "title": "Backwards",
        "start_time": start,
        "end_time": start - Duration::hours(1),
        "capacity": 5,
    });

    let response = post_json_auth(common::build_test_app(pool), "/api/v1/events", body, &org).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_cannot_drop_capacity_below_registrations(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 5).await;
    for name in ["a1", "a2", "a3"] {
        let (_, token) = create_user(&pool, name, Role::Attendee).await;
        assert_eq!(register(&pool, event_id, &token).await.status(), StatusCode::CREATED);
    }

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}"),
        json!({ "capacity": 2 }),
        &org,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_available_events_hide_full_ones(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let (_, bob) = create_user(&pool, "bob", Role::Attendee).await;
    let open = create_event(&pool, &org, 3).await;
    let single = create_event(&pool, &org, 1).await;
    register(&pool, single, &alice).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/events/available", &bob).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let events = json["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], open);
    assert_eq!(events[0]["available_capacity"], 3);
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mistyped_body_returns_json_error(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let start = Utc::now() + Duration::days(1);
    let body = json!({
        "title": "Typo",
        "start_time": start,
        "end_time": start + Duration::hours(1),
        "capacity": "ten",
    });

    let response =
        post_json_auth(common::build_test_app(pool), "/api/v1/events", body, &org).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("capacity"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_event_id_returns_json_error(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;

    let response = post_auth(
        common::build_test_app(pool),
        "/api/v1/events/abc/register",
        &alice,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_then_duplicate_is_rejected(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (alice_id, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = register(&pool, event_id, &alice).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["detail"],
        "Successfully registered for the event."
    );

    let response = register(&pool, event_id, &alice).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE_REGISTRATION");
    assert_eq!(json["error"], "You are already registered for this event.");

    assert!(RegistrationRepo::find(&pool, alice_id, event_id).await.unwrap().is_some());
    assert_eq!(RegistrationRepo::count_for_event(&pool, event_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_queues_confirmation_email(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;

    register(&pool, event_id, &alice).await;

    assert_eq!(
        JobRepo::count_active_of_type(&pool, JOB_SEND_REGISTRATION_CONFIRMATION)
            .await
            .unwrap(),
        1
    );
    let job = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(job.parameters["email"], "alice@test.com");
    assert_eq!(job.parameters["event_name"], "Rust meetup");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_for_missing_event_is_404(pool: PgPool) {
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;

    let response = register(&pool, 999_999, &alice).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_registrations_for_last_seat(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let (_, bob) = create_user(&pool, "bob", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 1).await;

    let (first, second) = tokio::join!(
        register(&pool, event_id, &alice),
        register(&pool, event_id, &bob),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    let rejected = if first.status() == StatusCode::BAD_REQUEST { first } else { second };
    assert_eq!(body_json(rejected).await["code"], "EVENT_FULL");
    assert_eq!(RegistrationRepo::count_for_event(&pool, event_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_my_registrations(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;
    register(&pool, event_id, &alice).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/registrations", &alice).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let registrations = json["data"].as_array().unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0]["event_id"], event_id);
    assert_eq!(registrations[0]["checked_in"], false);
}

// ---------------------------------------------------------------------------
// Check-in
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_in_once(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;
    register(&pool, event_id, &alice).await;
    let uri = format!("/api/v1/events/{event_id}/check-in");

    let response = post_auth(common::build_test_app(pool.clone()), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["detail"], "Successfully checked in.");

    let response = post_auth(common::build_test_app(pool), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "ALREADY_CHECKED_IN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_check_ins_succeed_once(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (alice_id, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;
    register(&pool, event_id, &alice).await;
    let uri = format!("/api/v1/events/{event_id}/check-in");

    let (first, second) = tokio::join!(
        post_auth(common::build_test_app(pool.clone()), &uri, &alice),
        post_auth(common::build_test_app(pool.clone()), &uri, &alice),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);
    let rejected = if first.status() == StatusCode::BAD_REQUEST { first } else { second };
    assert_eq!(body_json(rejected).await["code"], "ALREADY_CHECKED_IN");
    let registration = RegistrationRepo::find(&pool, alice_id, event_id)
        .await
        .unwrap()
        .unwrap();
    assert!(registration.checked_in);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_in_without_registration_is_404(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = post_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}/check-in"),
        &alice,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_REGISTERED");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_frees_the_seat(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (alice_id, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let (_, bob) = create_user(&pool, "bob", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 1).await;
    register(&pool, event_id, &alice).await;

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/cancel-registration"),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["detail"],
        "Registration canceled successfully."
    );
    assert!(RegistrationRepo::find(&pool, alice_id, event_id).await.unwrap().is_none());

    assert_eq!(register(&pool, event_id, &bob).await.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_after_start_keeps_registration(pool: PgPool) {
    let (org_id, _) = create_user(&pool, "org", Role::Organizer).await;
    let (alice_id, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let start = Utc::now() - Duration::hours(1);
    let event = EventRepo::create(
        &pool,
        org_id,
        &CreateEvent {
            title: "Already running".to_string(),
            description: String::new(),
            location: String::new(),
            start_time: start,
            end_time: start + Duration::hours(3),
            capacity: 10,
        },
    )
    .await
    .unwrap();
    RegistrationRepo::insert_guarded(&pool, alice_id, event.id).await.unwrap();

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{}/cancel-registration", event.id),
        &alice,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "EVENT_ALREADY_STARTED");
    assert!(RegistrationRepo::find(&pool, alice_id, event.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_without_registration_is_404(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = post_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}/cancel-registration"),
        &alice,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Capacity status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_capacity_status_counts_registrations(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 10).await;
    for name in ["a1", "a2", "a3"] {
        let (_, token) = create_user(&pool, name, Role::Attendee).await;
        register(&pool, event_id, &token).await;
    }

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/events/{event_id}/capacity-status"),
        &org,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_capacity"], 10);
    assert_eq!(json["registered_count"], 3);
    assert_eq!(json["remaining_capacity"], 7);
}

// ---------------------------------------------------------------------------
// Role enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organizer_cannot_register(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = register(&pool, event_id, &org).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attendee_cannot_view_capacity_or_create_events(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let (_, alice) = create_user(&pool, "alice", Role::Attendee).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/capacity-status"),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let start = Utc::now() + Duration::days(1);
    let body = json!({
        "title": "Not allowed",
        "start_time": start,
        "end_time": start + Duration::hours(1),
        "capacity": 5,
    });
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/events", body, &alice).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_organizer_cannot_touch_event(pool: PgPool) {
    let (_, owner) = create_user(&pool, "owner", Role::Organizer).await;
    let (_, other) = create_user(&pool, "other", Role::Organizer).await;
    let event_id = create_event(&pool, &owner, 10).await;

    for uri in [
        format!("/api/v1/events/{event_id}"),
        format!("/api/v1/events/{event_id}/capacity-status"),
        format!("/api/v1/events/{event_id}/registrations-report"),
    ] {
        let response = get_auth(common::build_test_app(pool.clone()), &uri, &other).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}"),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(EventRepo::find_by_id(&pool, event_id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_request_is_accepted_and_pending(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 10).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/registrations-report"),
        &org,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let task_id = body_json(response).await["task_id"].as_i64().unwrap();
    assert_eq!(
        JobRepo::count_active_of_type(&pool, JOB_GENERATE_REGISTRATION_REPORT)
            .await
            .unwrap(),
        1
    );

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/report-status/{task_id}"),
        &org,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pending");
    assert!(json.get("result").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_status_returns_result_when_done(pool: PgPool) {
    let (_, org) = create_user(&pool, "org", Role::Organizer).await;
    let event_id = create_event(&pool, &org, 10).await;
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/registrations-report"),
        &org,
    )
    .await;
    let task_id = body_json(response).await["task_id"].as_i64().unwrap();

    let job = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(job.id, task_id);
    let result = json!({
        "message": "Report generated successfully.",
        "file_name": "event_1_registrations.csv",
        "file_path": "reports/event_1_registrations.csv",
    });
    JobRepo::complete(&pool, task_id, &result).await.unwrap();

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/report-status/{task_id}"),
        &org,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["result"], result);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_status_hidden_from_other_organizers(pool: PgPool) {
    let (_, owner) = create_user(&pool, "owner", Role::Organizer).await;
    let (_, other) = create_user(&pool, "other", Role::Organizer).await;
    let event_id = create_event(&pool, &owner, 10).await;
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/events/{event_id}/registrations-report"),
        &owner,
    )
    .await;
    let task_id = body_json(response).await["task_id"].as_i64().unwrap();

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/report-status/{task_id}"),
        &other,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
