//! Handlers for time tracking.
//!
//! A user has at most one running timer across all tasks. The conflict
//! check here is read-then-write; the partial unique index
//! `uq_time_entries_one_running_per_user` decides the race when two
//! starts land together (the loser surfaces as 409).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::models::time_entry::StartTimer;
use stride_db::repositories::{TimeEntryRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::tasks::require_task;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for time entry listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for per-user time entry listing.
#[derive(Debug, Default, Deserialize)]
pub struct TimeEntryListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/users/{id}/timer/start
///
/// Start a timer. 409 when one is already running for the user.
pub async fn start_timer(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<StartTimer>,
) -> AppResult<impl IntoResponse> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    require_task(&state, input.task_id).await?;

    if let Some(running) = TimeEntryRepo::find_running(&state.pool, user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A timer is already running on task {}",
            running.task_id
        ))));
    }

    let entry = TimeEntryRepo::start(&state.pool, user_id, &input).await?;
    tracing::info!(user_id, task_id = input.task_id, "Timer started");
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// POST /api/v1/users/{id}/timer/stop
///
/// Stop the running timer, computing its duration. 409 when no timer is
/// running.
pub async fn stop_timer(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = TimeEntryRepo::stop(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "No timer is running".to_string(),
        )))?;

    tracing::info!(
        user_id,
        task_id = entry.task_id,
        duration_secs = entry.duration_secs,
        "Timer stopped",
    );
    Ok(Json(DataResponse { data: entry }))
}

/// GET /api/v1/tasks/{id}/time_entries
pub async fn list_for_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_task(&state, task_id).await?;
    let entries = TimeEntryRepo::list_for_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/users/{id}/time_entries
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<TimeEntryListQuery>,
) -> AppResult<impl IntoResponse> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    let entries = TimeEntryRepo::list_for_user(
        &state.pool,
        user_id,
        params.limit.unwrap_or(DEFAULT_LIMIT),
        params.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: entries }))
}
