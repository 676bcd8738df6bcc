//! Handlers for task comments.
//!
//! Each posted comment is broadcast as a JSON frame on the task's
//! WebSocket channel via the fan-out router (best-effort, no replay).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::models::comment::CreateComment;
use stride_db::repositories::{CommentRepo, MemberRepo};
use stride_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::tasks::require_task;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query identifying the comment author for deletion.
#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub author: DbId,
}

/// POST /api/v1/tasks/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let task = require_task(&state, task_id).await?;

    if MemberRepo::find_in_project(&state.pool, task.project_id, input.author_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Member {} does not belong to this project",
            input.author_id
        ))));
    }

    let comment = CommentRepo::create(&state.pool, task_id, &input).await?;

    let event = DomainEvent::new("comment.posted")
        .with_task(task_id)
        .with_project(task.project_id)
        .with_payload(serde_json::json!({
            "comment_id": comment.id,
            "task_id": task_id,
            "author_id": comment.author_id,
            "author_name": comment.author_name,
            "body": comment.body,
            "created_at": comment.created_at,
        }));
    state.event_bus.publish(event);

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// GET /api/v1/tasks/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_task(&state, task_id).await?;
    let comments = CommentRepo::list_for_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// DELETE /api/v1/comments/{id}?author={member_id}
///
/// A member may delete only their own comments.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<impl IntoResponse> {
    let deleted = CommentRepo::delete_own(&state.pool, comment_id, query.author).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
