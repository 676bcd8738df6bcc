//! Read-side summary and productivity report types.
//!
//! These are computed from committed Task/TaskHistory/TimeEntry rows only;
//! nothing here is persisted.

use serde::Serialize;
use sqlx::FromRow;
use stride_core::productivity::ProductivityScore;
use stride_core::types::DbId;

/// One status bucket in the status overview.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: i64,
}

/// Task counts by status for a project (optionally one sprint).
#[derive(Debug, Clone, Serialize)]
pub struct StatusOverview {
    pub total_work_items: i64,
    pub distribution: Vec<StatusCount>,
}

/// Per-assignee share of a project's tasks. `member_id = None` is the
/// bucket for unassigned tasks.
#[derive(Debug, Clone, Serialize)]
pub struct MemberLoad {
    pub member_id: Option<DbId>,
    pub member_name: Option<String>,
    pub task_count: i64,
    pub percent: f64,
}

/// Team workload breakdown for a project.
#[derive(Debug, Clone, Serialize)]
pub struct TeamWorkload {
    pub total_tasks: i64,
    pub members: Vec<MemberLoad>,
}

/// Per-sprint progress counts. `active = ongoing + under_review`,
/// `blocked = rejected + overdue`.
#[derive(Debug, Clone, Serialize)]
pub struct SprintProgress {
    pub sprint_id: DbId,
    pub title: String,
    pub total: i64,
    pub completed: i64,
    pub active: i64,
    pub blocked: i64,
    pub completed_percent: f64,
    pub active_percent: f64,
    pub blocked_percent: f64,
}

/// One priority bucket in the priority breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityCount {
    pub priority: &'static str,
    pub count: i64,
    pub percent: f64,
}

/// Activity counts over a trailing and a leading seven-day window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentActivity {
    pub created_last_week: i64,
    pub updated_last_week: i64,
    pub completed_last_week: i64,
    pub due_next_week: i64,
}

/// Raw per-member aggregation row feeding the productivity score.
#[derive(Debug, Clone, FromRow)]
pub struct MemberStatsRow {
    pub total: i64,
    pub closed: i64,
    pub overdue: i64,
    pub rejected: i64,
    pub avg_completion_hours: f64,
}

/// Raw per-member aggregation row for the whole-team productivity query.
#[derive(Debug, Clone, FromRow)]
pub struct MemberProductivityRow {
    pub member_id: DbId,
    pub member_name: String,
    pub total: i64,
    pub closed: i64,
    pub overdue: i64,
    pub rejected: i64,
    pub avg_completion_hours: f64,
}

/// A member's productivity report. `score = None` renders as "no data"
/// for members without any tasks.
#[derive(Debug, Clone, Serialize)]
pub struct MemberProductivity {
    pub member_id: DbId,
    pub member_name: String,
    pub total_tasks: i64,
    pub closed_tasks: i64,
    pub overdue_tasks: i64,
    pub rejected_tasks: i64,
    pub score: Option<ProductivityScore>,
}
