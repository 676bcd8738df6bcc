//! Handlers for project summary and productivity reports.
//!
//! All endpoints are read-only over committed data. An empty project or
//! sprint aggregates to zeroed structures; only a missing project or
//! member is an error.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::productivity::{self, MemberTaskStats};
use stride_core::types::DbId;
use stride_db::models::summary::MemberProductivity;
use stride_db::repositories::{MemberRepo, ProjectRepo, SprintRepo, SummaryRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional sprint narrowing for distribution endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub sprint_id: Option<DbId>,
}

/// 404 unless the project exists.
async fn require_project(state: &AppState, project_id: DbId) -> AppResult<()> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    Ok(())
}

/// 404 unless the sprint exists and belongs to the project.
async fn require_sprint(state: &AppState, project_id: DbId, sprint_id: DbId) -> AppResult<()> {
    let sprint = SprintRepo::find_by_id(&state.pool, sprint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }))?;
    if sprint.project_id != project_id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }));
    }
    Ok(())
}

/// GET /api/v1/projects/{id}/summary/status
///
/// Task counts by status; the distribution always sums to
/// `total_work_items`.
pub async fn status_overview(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<SummaryQuery>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    if let Some(sprint_id) = params.sprint_id {
        require_sprint(&state, project_id, sprint_id).await?;
    }
    let overview = SummaryRepo::status_overview(&state.pool, project_id, params.sprint_id).await?;
    Ok(Json(DataResponse { data: overview }))
}

/// GET /api/v1/projects/{id}/summary/workload
///
/// Per-assignee task counts and shares; unassigned tasks get their own
/// bucket.
pub async fn team_workload(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    let workload = SummaryRepo::team_workload(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: workload }))
}

/// GET /api/v1/projects/{id}/summary/sprints
///
/// Per-sprint completed/active/blocked counts and percentages.
pub async fn sprint_progress(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    let progress = SummaryRepo::sprint_progress(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/projects/{id}/summary/priorities
pub async fn priority_breakdown(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<SummaryQuery>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    if let Some(sprint_id) = params.sprint_id {
        require_sprint(&state, project_id, sprint_id).await?;
    }
    let breakdown =
        SummaryRepo::priority_breakdown(&state.pool, project_id, params.sprint_id).await?;
    Ok(Json(DataResponse { data: breakdown }))
}

/// GET /api/v1/projects/{id}/summary/activity
///
/// Trailing-week created/updated/completed counts and leading-week
/// due-and-open count.
pub async fn recent_activity(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    let activity = SummaryRepo::recent_activity(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: activity }))
}

/// GET /api/v1/projects/{id}/summary/productivity
///
/// Productivity reports for every member; members without tasks carry
/// `score: null` ("no data") rather than a zero score.
pub async fn member_productivity(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;
    let reports = SummaryRepo::member_productivity(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/projects/{id}/members/{member_id}/productivity
///
/// One member's productivity report.
pub async fn member_score(
    State(state): State<AppState>,
    Path((project_id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_project(&state, project_id).await?;

    let member = MemberRepo::find_with_user(&state.pool, member_id)
        .await?
        .filter(|m| m.project_id == project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let stats = SummaryRepo::member_stats(&state.pool, member_id).await?;
    let report = MemberProductivity {
        member_id,
        member_name: member.display_name,
        total_tasks: stats.total,
        closed_tasks: stats.closed,
        overdue_tasks: stats.overdue,
        rejected_tasks: stats.rejected,
        score: productivity::score(&MemberTaskStats {
            total: stats.total,
            closed: stats.closed,
            overdue: stats.overdue,
            rejected: stats.rejected,
            avg_completion_hours: stats.avg_completion_hours,
        }),
    };
    Ok(Json(DataResponse { data: report }))
}
