//! Integration tests for the read-side aggregations: status overview,
//! team workload, sprint progress, priority breakdown, recent activity,
//! and member productivity.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stride_core::status::TaskStatus;
use stride_core::workflow::ReviewOutcome;
use stride_db::repositories::{SummaryRepo, TaskRepo};

use common::{new_task, seed, Fixture};

async fn create_task(pool: &PgPool, fixture: &Fixture, title: &str) -> i64 {
    TaskRepo::create(
        pool,
        fixture.project_id,
        &new_task(fixture, title, Utc::now() + Duration::days(3)),
    )
    .await
    .unwrap()
    .task
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_distribution_sums_to_total(pool: PgPool) {
    let fixture = seed(&pool).await;

    let a = create_task(&pool, &fixture, "A").await;
    let b = create_task(&pool, &fixture, "B").await;
    create_task(&pool, &fixture, "C").await;

    TaskRepo::change_status(&pool, a, ReviewOutcome::UnderReview, None, "Devin Dev")
        .await
        .unwrap()
        .unwrap();
    TaskRepo::change_status(&pool, b, ReviewOutcome::Closed, None, "Lena Lead")
        .await
        .unwrap()
        .unwrap();

    let overview = SummaryRepo::status_overview(&pool, fixture.project_id, None)
        .await
        .unwrap();

    assert_eq!(overview.total_work_items, 3);
    let sum: i64 = overview.distribution.iter().map(|b| b.count).sum();
    assert_eq!(sum, overview.total_work_items);

    let count_of = |name: &str| {
        overview
            .distribution
            .iter()
            .find(|b| b.status == name)
            .map(|b| b.count)
            .unwrap()
    };
    assert_eq!(count_of("ongoing"), 1);
    assert_eq!(count_of("under_review"), 1);
    assert_eq!(count_of("closed"), 1);
    assert_eq!(count_of("overdue"), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_project_aggregates_to_zeroed_structures(pool: PgPool) {
    let fixture = seed(&pool).await;

    let overview = SummaryRepo::status_overview(&pool, fixture.project_id, None)
        .await
        .unwrap();
    assert_eq!(overview.total_work_items, 0);
    assert_eq!(overview.distribution.len(), TaskStatus::ALL.len());
    assert!(overview.distribution.iter().all(|b| b.count == 0));

    let workload = SummaryRepo::team_workload(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(workload.total_tasks, 0);
    assert!(workload.members.is_empty());

    // The sprint exists but holds no tasks: zero counts, zero percents.
    let progress = SummaryRepo::sprint_progress(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].total, 0);
    assert_eq!(progress[0].completed_percent, 0.0);

    let activity = SummaryRepo::recent_activity(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(activity.created_last_week, 0);
    assert_eq!(activity.due_next_week, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn workload_buckets_unassigned_tasks_separately(pool: PgPool) {
    let fixture = seed(&pool).await;

    let a = create_task(&pool, &fixture, "A").await;
    create_task(&pool, &fixture, "B").await;

    // Orphan one task the way a member removal would.
    sqlx::query("UPDATE tasks SET assigned_to = NULL WHERE id = $1")
        .bind(a)
        .execute(&pool)
        .await
        .unwrap();

    let workload = SummaryRepo::team_workload(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(workload.total_tasks, 2);
    assert_eq!(workload.members.len(), 2);

    let unassigned = workload
        .members
        .iter()
        .find(|m| m.member_id.is_none())
        .expect("unassigned bucket present");
    assert_eq!(unassigned.task_count, 1);
    assert_eq!(unassigned.percent, 50.0);

    let assigned = workload
        .members
        .iter()
        .find(|m| m.member_id == Some(fixture.dev_member))
        .unwrap();
    assert_eq!(assigned.task_count, 1);
    assert_eq!(assigned.member_name.as_deref(), Some("Devin Dev"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sprint_progress_buckets_active_and_blocked(pool: PgPool) {
    let fixture = seed(&pool).await;

    let a = create_task(&pool, &fixture, "A").await; // stays ongoing -> active
    let b = create_task(&pool, &fixture, "B").await;
    let c = create_task(&pool, &fixture, "C").await;
    let d = create_task(&pool, &fixture, "D").await;

    TaskRepo::change_status(&pool, b, ReviewOutcome::UnderReview, None, "Devin Dev")
        .await
        .unwrap()
        .unwrap(); // active
    TaskRepo::change_status(&pool, c, ReviewOutcome::Rejected, None, "Lena Lead")
        .await
        .unwrap()
        .unwrap(); // blocked
    TaskRepo::change_status(&pool, d, ReviewOutcome::Closed, None, "Lena Lead")
        .await
        .unwrap()
        .unwrap(); // completed

    let _ = a;

    let progress = SummaryRepo::sprint_progress(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    let sprint = &progress[0];
    assert_eq!(sprint.total, 4);
    assert_eq!(sprint.active, 2);
    assert_eq!(sprint.blocked, 1);
    assert_eq!(sprint.completed, 1);
    assert_eq!(sprint.completed_percent, 25.0);
    assert_eq!(sprint.active_percent, 50.0);
    assert_eq!(sprint.blocked_percent, 25.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn priority_breakdown_zero_fills_missing_levels(pool: PgPool) {
    let fixture = seed(&pool).await;
    create_task(&pool, &fixture, "A").await; // defaults to middle

    let breakdown = SummaryRepo::priority_breakdown(&pool, fixture.project_id, None)
        .await
        .unwrap();
    assert_eq!(breakdown.len(), 3);

    let middle = breakdown.iter().find(|b| b.priority == "middle").unwrap();
    assert_eq!(middle.count, 1);
    assert_eq!(middle.percent, 100.0);

    let low = breakdown.iter().find(|b| b.priority == "low").unwrap();
    assert_eq!(low.count, 0);
    assert_eq!(low.percent, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recent_activity_counts_windows(pool: PgPool) {
    let fixture = seed(&pool).await;

    // Due in three days, still open: counts as created, updated, and due.
    let a = create_task(&pool, &fixture, "A").await;
    // Closed now: counts as completed too.
    let b = create_task(&pool, &fixture, "B").await;
    TaskRepo::change_status(&pool, b, ReviewOutcome::Closed, None, "Lena Lead")
        .await
        .unwrap()
        .unwrap();
    let _ = a;

    let activity = SummaryRepo::recent_activity(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(activity.created_last_week, 2);
    assert_eq!(activity.updated_last_week, 2);
    assert_eq!(activity.completed_last_week, 1);
    // The closed task's deadline is inside the window but it no longer
    // counts as due.
    assert_eq!(activity.due_next_week, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_without_tasks_reports_no_score(pool: PgPool) {
    let fixture = seed(&pool).await;

    let reports = SummaryRepo::member_productivity(&pool, fixture.project_id)
        .await
        .unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.total_tasks == 0));
    assert!(reports.iter().all(|r| r.score.is_none()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_productivity_counts_their_assigned_tasks(pool: PgPool) {
    let fixture = seed(&pool).await;

    let a = create_task(&pool, &fixture, "A").await;
    create_task(&pool, &fixture, "B").await;
    TaskRepo::change_status(&pool, a, ReviewOutcome::Closed, None, "Lena Lead")
        .await
        .unwrap()
        .unwrap();

    let stats = SummaryRepo::member_stats(&pool, fixture.dev_member)
        .await
        .unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.closed, 1);
    assert_eq!(stats.overdue, 0);
    assert_eq!(stats.rejected, 0);
    // Freshly created and closed: completion time rounds to ~zero hours.
    assert!(stats.avg_completion_hours < 0.1);

    let reports = SummaryRepo::member_productivity(&pool, fixture.project_id)
        .await
        .unwrap();
    let dev = reports
        .iter()
        .find(|r| r.member_id == fixture.dev_member)
        .unwrap();
    assert_eq!(dev.total_tasks, 2);
    assert_eq!(dev.closed_tasks, 1);
    let score = dev.score.as_ref().expect("member has tasks");
    // completion 0.5*60 + turnaround (1-0)*20 + penalty (1-0)*20 = 70.
    assert_eq!(score.score, 70);

    let lead = reports
        .iter()
        .find(|r| r.member_id == fixture.lead_member)
        .unwrap();
    assert!(lead.score.is_none());
}
