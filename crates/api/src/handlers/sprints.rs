//! Handlers for the `/sprints` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use stride_core::error::CoreError;
use stride_core::roles::{Capability, Role};
use stride_core::sprint::validate_time_range;
use stride_core::status::SprintStatus;
use stride_core::types::DbId;
use stride_db::models::sprint::{CreateSprint, UpdateSprint};
use stride_db::repositories::{MemberRepo, ProjectRepo, SprintRepo};
use stride_events::queue::FileJob;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/sprints
///
/// Create a sprint. The start date may be at most 24 hours in the past
/// and the end date must not precede the start date.
pub async fn create_sprint(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateSprint>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    validate_time_range(input.start_date, input.end_date, Utc::now()).map_err(AppError::Core)?;

    let creator = MemberRepo::find_in_project(&state.pool, project_id, input.created_by)
        .await?
        .ok_or(AppError::Core(CoreError::Validation(format!(
            "The creator (member {}) does not belong to this project",
            input.created_by
        ))))?;

    let role = Role::from_id(creator.role_id).ok_or(AppError::InternalError(format!(
        "Member {} carries unknown role id {}",
        creator.id, creator.role_id
    )))?;
    if !role.can(Capability::ManageSprints) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only managers and admins can create sprints".to_string(),
        )));
    }

    let sprint = SprintRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(sprint_id = sprint.id, project_id, "Sprint created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: sprint })))
}

/// PATCH /api/v1/sprints/{id}
///
/// Partial update. A one-sided date change is validated against the
/// stored other bound; activating a sprint conflicts (409) when another
/// sprint in the project is already active. The partial unique index on
/// `(project_id) WHERE status_id = active` backs the check under
/// concurrency.
pub async fn update_sprint(
    State(state): State<AppState>,
    Path(sprint_id): Path<DbId>,
    Json(input): Json<UpdateSprint>,
) -> AppResult<impl IntoResponse> {
    let sprint = SprintRepo::find_by_id(&state.pool, sprint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }))?;

    if input.start_date.is_some() || input.end_date.is_some() {
        let start = input.start_date.unwrap_or(sprint.start_date);
        let end = input.end_date.unwrap_or(sprint.end_date);
        validate_time_range(start, end, Utc::now()).map_err(AppError::Core)?;
    }

    if let Some(status_id) = input.status_id {
        let status = SprintStatus::from_id(status_id).ok_or(AppError::Core(
            CoreError::Validation(format!("Unknown sprint status id {status_id}")),
        ))?;

        if status == SprintStatus::Active {
            if let Some(active) = SprintRepo::find_active(&state.pool, sprint.project_id).await? {
                if active.id != sprint_id {
                    return Err(AppError::Core(CoreError::Conflict(format!(
                        "Sprint {} is already active in this project",
                        active.id
                    ))));
                }
            }
        }
    }

    let updated = SprintRepo::update(&state.pool, sprint_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }))?;

    tracing::info!(sprint_id, "Sprint updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/sprints/{id}
///
/// Cascades the sprint's tasks (and their history/comments/attachments);
/// storage removal for every attached file is queued after commit.
pub async fn delete_sprint(
    State(state): State<AppState>,
    Path(sprint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let keys = SprintRepo::delete(&state.pool, sprint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }))?;

    tracing::info!(sprint_id, attachments = keys.len(), "Sprint deleted");

    if let Some(queue) = state.queue.clone() {
        tokio::spawn(async move {
            for key in keys {
                if let Err(e) = queue.publish_file(&FileJob::Remove { key: key.clone() }).await {
                    tracing::error!(error = %e, key, "Failed to queue storage removal");
                }
            }
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sprints/{id}
pub async fn get_sprint(
    State(state): State<AppState>,
    Path(sprint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let sprint = SprintRepo::find_by_id(&state.pool, sprint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        }))?;
    Ok(Json(DataResponse { data: sprint }))
}

/// GET /api/v1/projects/{id}/sprints
pub async fn list_sprints(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let sprints = SprintRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: sprints }))
}

/// GET /api/v1/projects/{id}/sprints/default
///
/// The project's default sprint: the most recently created active sprint,
/// else the one with the latest end date. `data: null` (not an error)
/// when the project has no sprints.
pub async fn get_default_sprint(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let sprint = SprintRepo::find_default(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: sprint }))
}
