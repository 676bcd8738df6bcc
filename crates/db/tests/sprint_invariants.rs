//! Integration tests for sprint invariants: the single-active-sprint
//! index, date-order check constraint, default-sprint selection, and
//! cascading deletion.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stride_core::status::SprintStatus;
use stride_db::models::attachment::CreateAttachment;
use stride_db::models::sprint::{CreateSprint, UpdateSprint};
use stride_db::repositories::{SprintRepo, TaskRepo};

use common::{new_task, seed};

fn activate() -> UpdateSprint {
    UpdateSprint {
        title: None,
        description: None,
        status_id: Some(SprintStatus::Active.id()),
        start_date: None,
        end_date: None,
    }
}

fn plain_sprint(created_by: i64, start_days: i64, end_days: i64) -> CreateSprint {
    CreateSprint {
        title: format!("Sprint {start_days}..{end_days}"),
        description: None,
        created_by,
        start_date: Utc::now() + Duration::days(start_days),
        end_date: Utc::now() + Duration::days(end_days),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn at_most_one_active_sprint_per_project(pool: PgPool) {
    let fixture = seed(&pool).await;
    let second = SprintRepo::create(
        &pool,
        fixture.project_id,
        &plain_sprint(fixture.lead_member, 14, 28),
    )
    .await
    .unwrap();

    SprintRepo::update(&pool, fixture.sprint_id, &activate())
        .await
        .unwrap()
        .unwrap();

    // Activating a second sprint trips the partial unique index, so the
    // invariant holds even when the service-layer check is bypassed.
    let result = SprintRepo::update(&pool, second.id, &activate()).await;
    match result {
        Err(sqlx::Error::Database(db_err)) => {
            assert_eq!(
                db_err.constraint(),
                Some("uq_sprints_one_active_per_project")
            );
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    // The losing update changed nothing.
    let second = SprintRepo::find_by_id(&pool, second.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.status_id, SprintStatus::Planned.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_sprints_in_different_projects_do_not_conflict(pool: PgPool) {
    let fixture = seed(&pool).await;
    let other = common::seed_as(&pool, "other").await;

    SprintRepo::update(&pool, fixture.sprint_id, &activate())
        .await
        .unwrap()
        .unwrap();
    SprintRepo::update(&pool, other.sprint_id, &activate())
        .await
        .unwrap()
        .unwrap();

    assert!(SprintRepo::find_active(&pool, fixture.project_id)
        .await
        .unwrap()
        .is_some());
    assert!(SprintRepo::find_active(&pool, other.project_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_is_rejected_by_the_store(pool: PgPool) {
    let fixture = seed(&pool).await;
    let result = SprintRepo::create(
        &pool,
        fixture.project_id,
        &plain_sprint(fixture.lead_member, 10, 5),
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_sprint_prefers_most_recently_created_active(pool: PgPool) {
    let fixture = seed(&pool).await;
    // A later-created sprint that is then activated.
    let newer = SprintRepo::create(
        &pool,
        fixture.project_id,
        &plain_sprint(fixture.lead_member, 14, 20),
    )
    .await
    .unwrap();
    SprintRepo::update(&pool, newer.id, &activate())
        .await
        .unwrap()
        .unwrap();

    let default = SprintRepo::find_default(&pool, fixture.project_id)
        .await
        .unwrap()
        .expect("project has sprints");
    assert_eq!(default.id, newer.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_sprint_falls_back_to_latest_end_date(pool: PgPool) {
    let fixture = seed(&pool).await;
    // No active sprints: the fixture sprint ends in 14 days, this one in 30.
    let late = SprintRepo::create(
        &pool,
        fixture.project_id,
        &plain_sprint(fixture.lead_member, 14, 30),
    )
    .await
    .unwrap();

    let default = SprintRepo::find_default(&pool, fixture.project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(default.id, late.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_sprint_is_none_for_project_without_sprints(pool: PgPool) {
    let fixture = seed(&pool).await;
    SprintRepo::delete(&pool, fixture.sprint_id)
        .await
        .unwrap()
        .unwrap();

    let default = SprintRepo::find_default(&pool, fixture.project_id)
        .await
        .unwrap();
    assert!(default.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_sprint_cascades_tasks_and_collects_attachment_keys(pool: PgPool) {
    let fixture = seed(&pool).await;

    let mut input = new_task(&fixture, "Doomed", Utc::now() + Duration::days(2));
    input.attachments = Some(vec![CreateAttachment {
        file_name: "notes.txt".to_string(),
        content_type: Some("text/plain".to_string()),
        file_path: "/tmp/staged/notes.txt".to_string(),
    }]);
    let created = TaskRepo::create(&pool, fixture.project_id, &input)
        .await
        .unwrap();

    let keys = SprintRepo::delete(&pool, fixture.sprint_id)
        .await
        .unwrap()
        .expect("sprint existed");
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0], created.uploads[0].object_key);

    assert!(TaskRepo::find_by_id(&pool, created.task.id)
        .await
        .unwrap()
        .is_none());
}
