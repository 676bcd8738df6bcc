//! Handlers for project membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stride_core::error::CoreError;
use stride_core::roles::Role;
use stride_core::types::DbId;
use stride_db::models::member::{AddMember, UpdateMember};
use stride_db::repositories::{MemberRepo, ProjectRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/members
///
/// Add a user to a project. 409 when the user is already a member.
pub async fn add_member(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<AddMember>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if Role::from_id(input.role_id).is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role id {}",
            input.role_id
        ))));
    }

    let member = MemberRepo::add(&state.pool, project_id, &input).await?;
    tracing::info!(member_id = member.id, project_id, "Member added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// GET /api/v1/projects/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let members = MemberRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// PATCH /api/v1/members/{id}
pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
    Json(input): Json<UpdateMember>,
) -> AppResult<impl IntoResponse> {
    if let Some(role_id) = input.role_id {
        if Role::from_id(role_id).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role id {role_id}"
            ))));
        }
    }

    let member = MemberRepo::update(&state.pool, member_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/members/{id}
pub async fn remove_member(
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = MemberRepo::remove(&state.pool, member_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
