//! Integration tests for the task lifecycle: creation, review
//! transitions, reassignment, deletion, and the history ledger.
//!
//! Exercises the full repository layer against a real database and
//! verifies the transactional contract: a committed transition is always
//! observable together with its history row and notification.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stride_core::status::TaskStatus;
use stride_core::workflow::ReviewOutcome;
use stride_db::models::attachment::CreateAttachment;
use stride_db::repositories::{NotificationRepo, TaskHistoryRepo, TaskRepo};

use common::{new_task, seed};

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_writes_task_history_and_assignee_notification(pool: PgPool) {
    let fixture = seed(&pool).await;

    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();

    assert_eq!(created.task.status_id, TaskStatus::Ongoing.id());
    assert_eq!(created.task.assigned_to, Some(fixture.dev_member));
    assert_eq!(created.assignee_user_id, fixture.dev_user);
    assert_eq!(created.assigner_user_id, fixture.lead_user);

    // Exactly one ledger entry: the initial ongoing row.
    let history = TaskHistoryRepo::list_for_task(&pool, created.task.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status_id, TaskStatus::Ongoing.id());
    assert!(history[0].comment.is_none());

    // Exactly one notification, addressed to the assignee.
    let notifications = NotificationRepo::list_for_user(&pool, fixture.dev_user, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("Fix login"));
    assert!(!notifications[0].is_viewed);

    let lead_inbox = NotificationRepo::list_for_user(&pool, fixture.lead_user, false, 50, 0)
        .await
        .unwrap();
    assert!(lead_inbox.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_attachments_records_metadata_and_uploads(pool: PgPool) {
    let fixture = seed(&pool).await;

    let mut input = new_task(&fixture, "Design document", Utc::now() + Duration::days(5));
    input.attachments = Some(vec![CreateAttachment {
        file_name: "spec.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        file_path: "/tmp/staged/spec.pdf".to_string(),
    }]);

    let created = TaskRepo::create(&pool, fixture.project_id, &input)
        .await
        .unwrap();

    assert_eq!(created.uploads.len(), 1);
    assert!(created.uploads[0]
        .object_key
        .starts_with(&format!("tasks/{}/", created.task.id)));
    assert_eq!(created.uploads[0].file_path, "/tmp/staged/spec.pdf");
}

// ---------------------------------------------------------------------------
// Review transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn under_review_appends_history_and_notifies_assigner(pool: PgPool) {
    let fixture = seed(&pool).await;
    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();

    let record = TaskRepo::change_status(
        &pool,
        created.task.id,
        ReviewOutcome::UnderReview,
        Some("please check"),
        "Devin Dev",
    )
    .await
    .unwrap()
    .expect("task exists");

    assert_eq!(record.task.status_id, TaskStatus::UnderReview.id());
    assert_eq!(record.receiver_user_id, Some(fixture.lead_user));
    assert_eq!(record.actor_user_id, Some(fixture.dev_user));

    let latest = TaskHistoryRepo::latest_for_task(&pool, created.task.id)
        .await
        .unwrap()
        .expect("ledger has rows");
    assert_eq!(latest.status_id, TaskStatus::UnderReview.id());
    assert_eq!(latest.comment.as_deref(), Some("please check"));

    // Exactly one notification for the assigner; the assignee still has
    // only the creation notice.
    let lead_inbox = NotificationRepo::list_for_user(&pool, fixture.lead_user, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(lead_inbox.len(), 1);
    assert!(lead_inbox[0].message.contains("Devin Dev"));

    let dev_inbox = NotificationRepo::list_for_user(&pool, fixture.dev_user, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(dev_inbox.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_and_closed_notify_the_assignee(pool: PgPool) {
    let fixture = seed(&pool).await;
    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();

    let rejected = TaskRepo::change_status(
        &pool,
        created.task.id,
        ReviewOutcome::Rejected,
        Some("needs tests"),
        "Lena Lead",
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rejected.receiver_user_id, Some(fixture.dev_user));

    let closed = TaskRepo::change_status(
        &pool,
        created.task.id,
        ReviewOutcome::Closed,
        None,
        "Lena Lead",
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(closed.receiver_user_id, Some(fixture.dev_user));
    assert_eq!(closed.task.status_id, TaskStatus::Closed.id());

    // Creation + rejection + closing = three notices for the assignee.
    let dev_inbox = NotificationRepo::list_for_user(&pool, fixture.dev_user, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(dev_inbox.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_status_on_missing_task_returns_none(pool: PgPool) {
    seed(&pool).await;
    let result = TaskRepo::change_status(&pool, 9999, ReviewOutcome::Closed, None, "Nobody")
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_reconstructs_the_exact_status_sequence(pool: PgPool) {
    let fixture = seed(&pool).await;
    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();
    let task_id = created.task.id;

    for outcome in [
        ReviewOutcome::UnderReview,
        ReviewOutcome::Rejected,
        ReviewOutcome::UnderReview,
        ReviewOutcome::Closed,
    ] {
        TaskRepo::change_status(&pool, task_id, outcome, None, "Lena Lead")
            .await
            .unwrap()
            .unwrap();
    }

    let history = TaskHistoryRepo::list_for_task(&pool, task_id).await.unwrap();
    let sequence: Vec<i16> = history.iter().rev().map(|h| h.status_id).collect();
    assert_eq!(
        sequence,
        vec![
            TaskStatus::Ongoing.id(),
            TaskStatus::UnderReview.id(),
            TaskStatus::Rejected.id(),
            TaskStatus::UnderReview.id(),
            TaskStatus::Closed.id(),
        ]
    );

    // The most recent ledger row always equals the task's current status.
    let task = TaskRepo::find_by_id(&pool, task_id).await.unwrap().unwrap();
    assert_eq!(history[0].status_id, task.status_id);
}

// ---------------------------------------------------------------------------
// Reassignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reassignment_notifies_old_and_new_assignee(pool: PgPool) {
    let fixture = seed(&pool).await;

    // A third member to reassign to.
    let other = stride_db::repositories::UserRepo::create(
        &pool,
        &stride_db::models::user::CreateUser {
            email: "qa@example.com".to_string(),
            display_name: "Quinn QA".to_string(),
        },
    )
    .await
    .unwrap();
    let other_member = stride_db::repositories::MemberRepo::add(
        &pool,
        fixture.project_id,
        &stride_db::models::member::AddMember {
            user_id: other.id,
            role_id: stride_core::roles::Role::Member.id(),
            position: None,
        },
    )
    .await
    .unwrap();

    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();

    let record = TaskRepo::reassign(&pool, created.task.id, other_member.id)
        .await
        .unwrap()
        .expect("task exists");

    assert_eq!(record.task.assigned_to, Some(other_member.id));
    assert_eq!(record.notices.len(), 2);

    let notified: Vec<_> = record.notices.iter().map(|n| n.user_id).collect();
    assert!(notified.contains(&fixture.dev_user));
    assert!(notified.contains(&other.id));

    // Previous assignee: creation + removal. New assignee: assignment.
    let dev_inbox = NotificationRepo::list_for_user(&pool, fixture.dev_user, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(dev_inbox.len(), 2);
    let other_inbox = NotificationRepo::list_for_user(&pool, other.id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(other_inbox.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reassignment_to_same_member_notifies_nobody(pool: PgPool) {
    let fixture = seed(&pool).await;
    let created = TaskRepo::create(
        &pool,
        fixture.project_id,
        &new_task(&fixture, "Fix login", Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap();

    let record = TaskRepo::reassign(&pool, created.task.id, fixture.dev_member)
        .await
        .unwrap()
        .unwrap();
    assert!(record.notices.is_empty());
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_cascades_and_returns_attachment_keys(pool: PgPool) {
    let fixture = seed(&pool).await;

    let mut input = new_task(&fixture, "Design document", Utc::now() + Duration::days(5));
    input.attachments = Some(vec![CreateAttachment {
        file_name: "spec.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        file_path: "/tmp/staged/spec.pdf".to_string(),
    }]);
    let created = TaskRepo::create(&pool, fixture.project_id, &input)
        .await
        .unwrap();
    let task_id = created.task.id;

    let keys = TaskRepo::delete(&pool, task_id)
        .await
        .unwrap()
        .expect("task existed");
    assert_eq!(keys, vec![created.uploads[0].object_key.clone()]);

    assert!(TaskRepo::find_by_id(&pool, task_id).await.unwrap().is_none());
    let history = TaskHistoryRepo::list_for_task(&pool, task_id).await.unwrap();
    assert!(history.is_empty());

    // A second delete finds nothing.
    assert!(TaskRepo::delete(&pool, task_id).await.unwrap().is_none());
}
