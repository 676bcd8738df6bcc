//! Handlers for the `/tasks` resource and its lifecycle.
//!
//! The ordering contract for every mutating endpoint here: the repository
//! commits the task row, its history entry, and the receiver's
//! notification in one transaction; only then are external effects
//! (email jobs, file jobs, WebSocket frames) published. A failed publish
//! is logged and never turns a committed change into a client error.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::sprint::validate_deadline;
use stride_core::status::TaskStatus;
use stride_core::types::DbId;
use stride_core::workflow::ReviewOutcome;
use stride_db::models::attachment::CreateAttachment;
use stride_db::models::task::{CreateTask, Task, UpdateTask};
use stride_db::repositories::{
    AttachmentRepo, MemberRepo, ProjectRepo, SprintRepo, TaskHistoryRepo, TaskListQuery, TaskRepo,
};
use stride_events::queue::{EmailJob, EmailParams, FileJob};
use stride_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Target status name: `under_review`, `rejected`, or `closed`.
    pub status: String,
    /// Reviewer comment recorded in the history ledger.
    pub comment: Option<String>,
    /// Display name of the acting member, used in the notification text.
    pub actor_name: String,
}

/// Query identifying the acting member for permission-checked operations.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub acting_member: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the email job for a task notification.
fn email_job(
    kind: &str,
    to: &str,
    project_id: DbId,
    project_title: &str,
    task_title: &str,
) -> EmailJob {
    EmailJob {
        kind: kind.to_string(),
        to: to.to_string(),
        params: EmailParams {
            project_title: project_title.to_string(),
            task_title: task_title.to_string(),
            role: None,
            position: None,
            project_id,
            page: "tasks".to_string(),
        },
    }
}

/// Fire-and-forget a file job. Failures are logged with the object key so
/// orphaned storage content can be reconciled by hand.
fn spawn_file_job(state: &AppState, job: FileJob, task_id: DbId) {
    let Some(queue) = state.queue.clone() else {
        tracing::debug!(task_id, "Queue gateway not configured, skipping file job");
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = queue.publish_file(&job).await {
            tracing::error!(error = %e, task_id, job = ?job, "Failed to publish file job");
        }
    });
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/tasks
///
/// Create a task. Validates that the deadline falls inside the owning
/// sprint's window and that assigner and assignee both belong to the
/// project, then commits task + initial history + assignee notification
/// in one transaction. File uploads and the assignment email are queued
/// after commit. Returns 201 with the created task.
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let sprint = SprintRepo::find_by_id(&state.pool, input.sprint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sprint",
            id: input.sprint_id,
        }))?;
    if sprint.project_id != project_id {
        return Err(AppError::Core(CoreError::Validation(
            "Sprint belongs to a different project".to_string(),
        )));
    }

    validate_deadline(input.deadline, sprint.start_date, sprint.end_date)
        .map_err(AppError::Core)?;

    for (member_id, label) in [(input.assigned_by, "assigner"), (input.assigned_to, "assignee")] {
        if MemberRepo::find_in_project(&state.pool, project_id, member_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "The {label} (member {member_id}) does not belong to this project"
            ))));
        }
    }

    let created = TaskRepo::create(&state.pool, project_id, &input).await?;

    tracing::info!(
        task_id = created.task.id,
        project_id,
        sprint_id = created.task.sprint_id,
        "Task created",
    );

    // Post-commit external effects: staged uploads, then the assignment
    // notification fan-out.
    for upload in &created.uploads {
        spawn_file_job(
            &state,
            FileJob::Upload {
                key: upload.object_key.clone(),
                content_type: upload.content_type.clone(),
                file_path: upload.file_path.clone(),
            },
            created.task.id,
        );
    }

    let event = DomainEvent::new("task.created")
        .with_task(created.task.id)
        .with_project(project_id)
        .with_actor(created.assigner_user_id)
        .with_receiver(created.assignee_user_id)
        .with_email(email_job(
            created.template_kind,
            &created.assignee_email,
            project_id,
            &created.project_title,
            &created.task.title,
        ))
        .with_payload(serde_json::json!({
            "task_id": created.task.id,
            "title": created.task.title,
            "message": created.notification_message,
        }));
    state.event_bus.publish(event);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: created.task }),
    ))
}

// ---------------------------------------------------------------------------
// Status change
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/status
///
/// Apply a review transition. Only `under_review`, `rejected`, and
/// `closed` are caller-settable; `ongoing` is the creation default and
/// `overdue` belongs to the sweeper, so both are rejected with 400.
pub async fn change_status(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<ChangeStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status = TaskStatus::from_name(&input.status).ok_or(AppError::Core(
        CoreError::InvalidTransition(format!("Unknown status '{}'", input.status)),
    ))?;
    let outcome = ReviewOutcome::from_status(status).map_err(AppError::Core)?;

    let record = TaskRepo::change_status(
        &state.pool,
        task_id,
        outcome,
        input.comment.as_deref(),
        &input.actor_name,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Task",
        id: task_id,
    }))?;

    tracing::info!(
        task_id,
        status = status.name(),
        receiver_user_id = ?record.receiver_user_id,
        "Task status changed",
    );

    let mut event = DomainEvent::new("task.status_changed")
        .with_task(task_id)
        .with_project(record.task.project_id)
        .with_payload(serde_json::json!({
            "task_id": task_id,
            "status": status.name(),
            "comment": input.comment,
            "message": record.notification_message,
        }));
    if let Some(actor) = record.actor_user_id {
        event = event.with_actor(actor);
    }
    if let (Some(receiver), Some(email)) = (record.receiver_user_id, &record.receiver_email) {
        event = event.with_receiver(receiver).with_email(email_job(
            record.template_kind,
            email,
            record.task.project_id,
            &record.project_title,
            &record.task.title,
        ));
    }
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: record.task }))
}

// ---------------------------------------------------------------------------
// Update / reassign
// ---------------------------------------------------------------------------

/// PATCH /api/v1/tasks/{id}
///
/// Update a task's plain fields; a present `assigned_to` triggers the
/// reassignment sub-flow (old assignee notified of removal, new assignee
/// notified of assignment, both transactionally). `assigned_by`, status,
/// and the owning project cannot be changed here.
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    // A moved deadline must still sit inside the sprint window.
    if let Some(deadline) = input.deadline {
        let sprint = SprintRepo::find_by_id(&state.pool, task.sprint_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Sprint",
                id: task.sprint_id,
            }))?;
        validate_deadline(deadline, sprint.start_date, sprint.end_date)
            .map_err(AppError::Core)?;
    }

    if let Some(new_assignee) = input.assigned_to {
        if MemberRepo::find_in_project(&state.pool, task.project_id, new_assignee)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Member {new_assignee} does not belong to this project"
            ))));
        }

        let record = TaskRepo::reassign(&state.pool, task_id, new_assignee)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }))?;

        tracing::info!(task_id, new_assignee, "Task reassigned");

        for notice in &record.notices {
            let event = DomainEvent::new("task.reassigned")
                .with_task(task_id)
                .with_project(record.task.project_id)
                .with_receiver(notice.user_id)
                .with_email(email_job(
                    notice.template_kind,
                    &notice.email,
                    record.task.project_id,
                    &record.project_title,
                    &record.task.title,
                ))
                .with_payload(serde_json::json!({
                    "task_id": task_id,
                    "message": notice.message,
                }));
            state.event_bus.publish(event);
        }
    }

    let updated = TaskRepo::update(&state.pool, task_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/tasks/{id}?acting_member={member_id}
///
/// Only the task's original assigner may delete it. Cascades history,
/// comments, attachment metadata, and time entries; storage removal for
/// attached files is queued after the delete commits.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    if task.assigned_by != actor.acting_member {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the task's assigner can delete it".to_string(),
        )));
    }

    let keys = TaskRepo::delete(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    tracing::info!(task_id, attachments = keys.len(), "Task deleted");

    for key in keys {
        spawn_file_job(&state, FileJob::Remove { key }, task_id);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;
    Ok(Json(DataResponse { data: task }))
}

/// GET /api/v1/projects/{id}/tasks
///
/// List a project's tasks with optional `sprint_id`, `status_id`,
/// `assigned_to`, `limit`, and `offset` query parameters.
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<TaskListQuery>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let tasks = TaskRepo::list_by_project(&state.pool, project_id, &params).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{id}/history
///
/// The task's full status ledger, most recent first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;
    let history = TaskHistoryRepo::list_for_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse { data: history }))
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/attachments
///
/// Attach a file: metadata commits first, the upload job is queued after.
pub async fn add_attachment(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateAttachment>,
) -> AppResult<impl IntoResponse> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    let attachment = AttachmentRepo::add(&state.pool, task_id, &input).await?;

    spawn_file_job(
        &state,
        FileJob::Upload {
            key: attachment.object_key.clone(),
            content_type: attachment.content_type.clone(),
            file_path: input.file_path.clone(),
        },
        task_id,
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: attachment })))
}

/// GET /api/v1/tasks/{id}/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;
    let attachments = AttachmentRepo::list_for_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse { data: attachments }))
}

/// DELETE /api/v1/tasks/{id}/attachments/{attachment_id}
///
/// Detach a file: metadata removal commits first, storage removal is
/// queued after.
pub async fn remove_attachment(
    State(state): State<AppState>,
    Path((task_id, attachment_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let key = AttachmentRepo::remove(&state.pool, task_id, attachment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id: attachment_id,
        }))?;

    spawn_file_job(&state, FileJob::Remove { key }, task_id);

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Response helpers shared with other modules
// ---------------------------------------------------------------------------

/// Shorthand used by sibling handler modules to 404 on a missing task.
pub(crate) async fn require_task(state: &AppState, task_id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))
}
