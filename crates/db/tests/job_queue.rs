//! Integration tests for the jobs queue and the reminder dedupe ledger.

use chrono::{Duration, Utc};
use eventreg_core::jobs::{JOB_GENERATE_REGISTRATION_REPORT, JOB_SEND_DAILY_REMINDERS};
use eventreg_core::roles::Role;
use eventreg_db::models::event::CreateEvent;
use eventreg_db::models::status::JobStatus;
use eventreg_db::models::user::CreateUser;
use eventreg_db::repositories::{EventRepo, JobRepo, ReminderRepo, UserRepo};
use eventreg_core::types::DbId;
use sqlx::PgPool;

async fn create_organizer(pool: &PgPool, username: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.into(),
            email: format!("{username}@test.com"),
            password_hash: "x".into(),
            role: Role::Organizer,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enqueue_then_claim(pool: PgPool) {
    let job = JobRepo::enqueue(
        &pool,
        JOB_GENERATE_REGISTRATION_REPORT,
        &serde_json::json!({ "event_id": 1 }),
        None,
    )
    .await
    .unwrap();
    assert_eq!(job.status(), Some(JobStatus::Pending));
    assert_eq!(job.status_view().status, "pending");

    let claimed = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.status(), Some(JobStatus::Running));
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.claimed_at.is_some());

    // Nothing else is pending.
    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claims_are_fifo(pool: PgPool) {
    let first = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();
    let second = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();

    assert_eq!(JobRepo::claim_next(&pool).await.unwrap().unwrap().id, first.id);
    assert_eq!(JobRepo::claim_next(&pool).await.unwrap().unwrap().id, second.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_claims_never_share_a_job(pool: PgPool) {
    for _ in 0..4 {
        JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
            .await
            .unwrap();
    }

    let (a, b, c, d) = tokio::join!(
        JobRepo::claim_next(&pool),
        JobRepo::claim_next(&pool),
        JobRepo::claim_next(&pool),
        JobRepo::claim_next(&pool),
    );
    let mut ids: Vec<i64> = [a, b, c, d]
        .into_iter()
        .filter_map(|r| r.unwrap().map(|j| j.id))
        .collect();
    let claimed = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), claimed, "a job was claimed twice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_and_fail_are_reported_as_completed(pool: PgPool) {
    let ok = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();
    let bad = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();

    JobRepo::complete(&pool, ok.id, &serde_json::json!({ "sent": 3 }))
        .await
        .unwrap();
    JobRepo::fail(&pool, bad.id, "smtp down").await.unwrap();

    let ok = JobRepo::find_by_id(&pool, ok.id).await.unwrap().unwrap();
    let view = ok.status_view();
    assert_eq!(view.task_id, ok.id);
    assert_eq!(view.status, "completed");
    assert_eq!(view.result, Some(serde_json::json!({ "sent": 3 })));

    let bad = JobRepo::find_by_id(&pool, bad.id).await.unwrap().unwrap();
    assert_eq!(bad.status(), Some(JobStatus::Failed));
    let view = bad.status_view();
    assert_eq!(view.status, "completed");
    assert_eq!(view.result, Some(serde_json::json!({ "error": "smtp down" })));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_is_scoped_to_type_and_submitter(pool: PgPool) {
    let owner = create_organizer(&pool, "owner").await;
    let other = create_organizer(&pool, "other").await;
    let job = JobRepo::enqueue(
        &pool,
        JOB_GENERATE_REGISTRATION_REPORT,
        &serde_json::json!({ "event_id": 1 }),
        Some(owner),
    )
    .await
    .unwrap();

    let view = JobRepo::status(&pool, job.id, JOB_GENERATE_REGISTRATION_REPORT, owner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.task_id, job.id);
    assert_eq!(view.status, "pending");

    assert!(JobRepo::status(&pool, job.id, JOB_GENERATE_REGISTRATION_REPORT, other)
        .await
        .unwrap()
        .is_none());
    assert!(JobRepo::status(&pool, job.id, JOB_SEND_DAILY_REMINDERS, owner)
        .await
        .unwrap()
        .is_none());
    assert!(JobRepo::status(&pool, job.id + 1000, JOB_GENERATE_REGISTRATION_REPORT, owner)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_claims_are_redelivered(pool: PgPool) {
    let job = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();
    JobRepo::claim_next(&pool).await.unwrap().unwrap();

    // A cutoff in the past leaves the fresh claim alone.
    let requeued = JobRepo::requeue_stale(&pool, Utc::now() - Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(requeued, 0);

    // A cutoff in the future treats it as abandoned.
    let requeued = JobRepo::requeue_stale(&pool, Utc::now() + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(requeued, 1);

    let again = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(again.id, job.id);
    assert_eq!(again.attempts, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_count_active_of_type(pool: PgPool) {
    let job = JobRepo::enqueue(&pool, JOB_SEND_DAILY_REMINDERS, &serde_json::json!({}), None)
        .await
        .unwrap();
    assert_eq!(
        JobRepo::count_active_of_type(&pool, JOB_SEND_DAILY_REMINDERS)
            .await
            .unwrap(),
        1
    );
    JobRepo::complete(&pool, job.id, &serde_json::json!({})).await.unwrap();
    assert_eq!(
        JobRepo::count_active_of_type(&pool, JOB_SEND_DAILY_REMINDERS)
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reminder_key_claimed_once(pool: PgPool) {
    let organizer = create_organizer(&pool, "org").await;
    let start = Utc::now() + Duration::days(1);
    let event = EventRepo::create(
        &pool,
        organizer,
        &CreateEvent {
            title: "Tomorrow".into(),
            description: String::new(),
            location: String::new(),
            start_time: start,
            end_time: start + Duration::hours(1),
            capacity: 5,
        },
    )
    .await
    .unwrap();
    let date = start.date_naive();

    assert!(ReminderRepo::claim(&pool, event.id, date).await.unwrap());
    assert!(!ReminderRepo::claim(&pool, event.id, date).await.unwrap());

    ReminderRepo::mark_sent(&pool, event.id, date, 4).await.unwrap();
    let row = ReminderRepo::find(&pool, event.id, date).await.unwrap().unwrap();
    assert_eq!(row.recipient_count, 4);
    assert!(row.sent_at.is_some());
}
