//! Handlers for the notification bell.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::repositories::{NotificationRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 200;

/// Query parameters for notification listing.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    pub unviewed_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/users/{id}/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<NotificationListQuery>,
) -> AppResult<impl IntoResponse> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        user_id,
        params.unviewed_only.unwrap_or(false),
        params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        params.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: notifications }))
}

/// POST /api/v1/users/{user_id}/notifications/{id}/viewed
pub async fn mark_viewed(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let marked = NotificationRepo::mark_viewed(&state.pool, notification_id, user_id).await?;
    if !marked {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }
    Ok(Json(DataResponse { data: true }))
}

/// POST /api/v1/users/{id}/notifications/viewed
///
/// Mark everything as viewed; returns the number of rows touched.
pub async fn mark_all_viewed(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::mark_all_viewed(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: count }))
}

/// GET /api/v1/users/{id}/notifications/unviewed_count
pub async fn unviewed_count(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::unviewed_count(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: count }))
}
