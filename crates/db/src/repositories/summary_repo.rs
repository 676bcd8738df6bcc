//! Read-side aggregation over committed task, history, and time data.
//!
//! Every method here is side-effect-free and tolerates empty result sets:
//! a project or sprint without tasks aggregates to zeroed structures.
//! Whether the project/member itself exists is checked by the caller.

use sqlx::PgPool;
use stride_core::productivity::{self, MemberTaskStats, ACTIVITY_WINDOW_DAYS};
use stride_core::status::{Priority, TaskStatus};
use stride_core::types::DbId;

use crate::models::summary::{
    MemberLoad, MemberProductivity, MemberProductivityRow, MemberStatsRow, PriorityCount,
    RecentActivity, SprintProgress, StatusCount, StatusOverview, TeamWorkload,
};

/// Provides summary and productivity aggregations.
pub struct SummaryRepo;

impl SummaryRepo {
    /// Task counts by status for a project, optionally narrowed to one
    /// sprint. Buckets with no tasks are zero-filled so the distribution
    /// always sums to `total_work_items`.
    pub async fn status_overview(
        pool: &PgPool,
        project_id: DbId,
        sprint_id: Option<DbId>,
    ) -> Result<StatusOverview, sqlx::Error> {
        let filter = if sprint_id.is_some() {
            "AND sprint_id = $2"
        } else {
            ""
        };
        let query = format!(
            "SELECT status_id, COUNT(*) FROM tasks \
             WHERE project_id = $1 {filter} \
             GROUP BY status_id"
        );

        let mut q = sqlx::query_as::<_, (i16, i64)>(&query).bind(project_id);
        if let Some(sprint_id) = sprint_id {
            q = q.bind(sprint_id);
        }
        let rows = q.fetch_all(pool).await?;

        let mut distribution: Vec<StatusCount> = TaskStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.name(),
                count: 0,
            })
            .collect();
        let mut total = 0;

        for (status_id, count) in rows {
            total += count;
            if let Some(status) = TaskStatus::from_id(status_id) {
                if let Some(bucket) = distribution
                    .iter_mut()
                    .find(|b| b.status == status.name())
                {
                    bucket.count = count;
                }
            }
        }

        Ok(StatusOverview {
            total_work_items: total,
            distribution,
        })
    }

    /// Per-assignee task counts and percentage share for a project.
    /// Unassigned tasks land in a bucket with `member_id = None`.
    pub async fn team_workload(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<TeamWorkload, sqlx::Error> {
        let rows: Vec<(Option<DbId>, Option<String>, i64)> = sqlx::query_as(
            "SELECT t.assigned_to, u.display_name, COUNT(*) \
             FROM tasks t \
             LEFT JOIN project_members m ON m.id = t.assigned_to \
             LEFT JOIN users u ON u.id = m.user_id \
             WHERE t.project_id = $1 \
             GROUP BY t.assigned_to, u.display_name \
             ORDER BY COUNT(*) DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let total: i64 = rows.iter().map(|(_, _, count)| count).sum();

        let members = rows
            .into_iter()
            .map(|(member_id, member_name, task_count)| MemberLoad {
                member_id,
                member_name,
                task_count,
                percent: productivity::percent(task_count, total),
            })
            .collect();

        Ok(TeamWorkload {
            total_tasks: total,
            members,
        })
    }

    /// Per-sprint completed/active/blocked counts and percentages for a
    /// project. `active = ongoing + under_review`,
    /// `blocked = rejected + overdue`.
    pub async fn sprint_progress(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<SprintProgress>, sqlx::Error> {
        let rows: Vec<(DbId, String, i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT s.id, s.title, \
                    COUNT(t.id), \
                    COUNT(t.id) FILTER (WHERE t.status_id = $2), \
                    COUNT(t.id) FILTER (WHERE t.status_id IN ($3, $4)), \
                    COUNT(t.id) FILTER (WHERE t.status_id IN ($5, $6)) \
             FROM sprints s \
             LEFT JOIN tasks t ON t.sprint_id = s.id \
             WHERE s.project_id = $1 \
             GROUP BY s.id, s.title \
             ORDER BY s.start_date DESC, s.id DESC",
        )
        .bind(project_id)
        .bind(TaskStatus::Closed.id())
        .bind(TaskStatus::Ongoing.id())
        .bind(TaskStatus::UnderReview.id())
        .bind(TaskStatus::Rejected.id())
        .bind(TaskStatus::Overdue.id())
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(sprint_id, title, total, completed, active, blocked)| SprintProgress {
                    sprint_id,
                    title,
                    total,
                    completed,
                    active,
                    blocked,
                    completed_percent: productivity::percent(completed, total),
                    active_percent: productivity::percent(active, total),
                    blocked_percent: productivity::percent(blocked, total),
                },
            )
            .collect())
    }

    /// Task counts and percentages by priority level, zero-filled.
    pub async fn priority_breakdown(
        pool: &PgPool,
        project_id: DbId,
        sprint_id: Option<DbId>,
    ) -> Result<Vec<PriorityCount>, sqlx::Error> {
        let filter = if sprint_id.is_some() {
            "AND sprint_id = $2"
        } else {
            ""
        };
        let query = format!(
            "SELECT priority_id, COUNT(*) FROM tasks \
             WHERE project_id = $1 {filter} \
             GROUP BY priority_id"
        );

        let mut q = sqlx::query_as::<_, (i16, i64)>(&query).bind(project_id);
        if let Some(sprint_id) = sprint_id {
            q = q.bind(sprint_id);
        }
        let rows = q.fetch_all(pool).await?;
        let total: i64 = rows.iter().map(|(_, count)| count).sum();

        Ok(Priority::ALL
            .iter()
            .map(|priority| {
                let count = rows
                    .iter()
                    .find(|(id, _)| *id == priority.id())
                    .map(|(_, count)| *count)
                    .unwrap_or(0);
                PriorityCount {
                    priority: priority.name(),
                    count,
                    percent: productivity::percent(count, total),
                }
            })
            .collect())
    }

    /// Activity counts for a project: tasks created/updated/completed in
    /// the trailing window, and tasks due in the leading window that are
    /// not yet closed.
    pub async fn recent_activity(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<RecentActivity, sqlx::Error> {
        let query = format!(
            "SELECT \
                 COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '{ACTIVITY_WINDOW_DAYS} days') AS created_last_week, \
                 COUNT(*) FILTER (WHERE updated_at >= NOW() - INTERVAL '{ACTIVITY_WINDOW_DAYS} days') AS updated_last_week, \
                 COUNT(*) FILTER (WHERE status_id = $2 \
                     AND updated_at >= NOW() - INTERVAL '{ACTIVITY_WINDOW_DAYS} days') AS completed_last_week, \
                 COUNT(*) FILTER (WHERE status_id <> $2 \
                     AND deadline BETWEEN NOW() AND NOW() + INTERVAL '{ACTIVITY_WINDOW_DAYS} days') AS due_next_week \
             FROM tasks WHERE project_id = $1"
        );
        sqlx::query_as::<_, RecentActivity>(&query)
            .bind(project_id)
            .bind(TaskStatus::Closed.id())
            .fetch_one(pool)
            .await
    }

    /// Raw task statistics for one member across their assigned tasks.
    pub async fn member_stats(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<MemberStatsRow, sqlx::Error> {
        sqlx::query_as::<_, MemberStatsRow>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status_id = $2) AS closed, \
                    COUNT(*) FILTER (WHERE status_id = $3) AS overdue, \
                    COUNT(*) FILTER (WHERE status_id = $4) AS rejected, \
                    COALESCE(AVG(EXTRACT(EPOCH FROM updated_at - created_at) / 3600.0) \
                        FILTER (WHERE status_id = $2), 0)::DOUBLE PRECISION \
                        AS avg_completion_hours \
             FROM tasks WHERE assigned_to = $1",
        )
        .bind(member_id)
        .bind(TaskStatus::Closed.id())
        .bind(TaskStatus::Overdue.id())
        .bind(TaskStatus::Rejected.id())
        .fetch_one(pool)
        .await
    }

    /// Productivity reports for every member of a project. Members with
    /// no tasks carry `score = None` rather than a bottom ranking.
    pub async fn member_productivity(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MemberProductivity>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MemberProductivityRow>(
            "SELECT m.id AS member_id, u.display_name AS member_name, \
                    COUNT(t.id) AS total, \
                    COUNT(t.id) FILTER (WHERE t.status_id = $2) AS closed, \
                    COUNT(t.id) FILTER (WHERE t.status_id = $3) AS overdue, \
                    COUNT(t.id) FILTER (WHERE t.status_id = $4) AS rejected, \
                    COALESCE(AVG(EXTRACT(EPOCH FROM t.updated_at - t.created_at) / 3600.0) \
                        FILTER (WHERE t.status_id = $2), 0)::DOUBLE PRECISION \
                        AS avg_completion_hours \
             FROM project_members m \
             JOIN users u ON u.id = m.user_id \
             LEFT JOIN tasks t ON t.assigned_to = m.id \
             WHERE m.project_id = $1 \
             GROUP BY m.id, u.display_name \
             ORDER BY m.id",
        )
        .bind(project_id)
        .bind(TaskStatus::Closed.id())
        .bind(TaskStatus::Overdue.id())
        .bind(TaskStatus::Rejected.id())
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let stats = MemberTaskStats {
                    total: row.total,
                    closed: row.closed,
                    overdue: row.overdue,
                    rejected: row.rejected,
                    avg_completion_hours: row.avg_completion_hours,
                };
                MemberProductivity {
                    member_id: row.member_id,
                    member_name: row.member_name,
                    total_tasks: row.total,
                    closed_tasks: row.closed,
                    overdue_tasks: row.overdue,
                    rejected_tasks: row.rejected,
                    score: productivity::score(&stats),
                }
            })
            .collect())
    }
}
