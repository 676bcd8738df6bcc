//! Task entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

use crate::models::attachment::CreateAttachment;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub sprint_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub priority_id: i16,
    pub deadline: Timestamp,
    pub status_id: i16,
    pub assigned_by: DbId,
    pub assigned_to: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `task_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskHistoryEntry {
    pub id: DbId,
    pub task_id: DbId,
    pub status_id: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// A task joined with both parties and its project, loaded for
/// notification composition.
#[derive(Debug, Clone, FromRow)]
pub struct TaskParties {
    pub task_id: DbId,
    pub task_title: String,
    pub status_id: i16,
    pub project_id: DbId,
    pub project_title: String,
    pub assigner_member_id: DbId,
    pub assigner_user_id: DbId,
    pub assigner_name: String,
    pub assigner_email: String,
    pub assignee_member_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
}

/// DTO for creating a task. `project_id` comes from the request path.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub sprint_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub priority_id: Option<i16>,
    pub deadline: Timestamp,
    pub assigned_by: DbId,
    pub assigned_to: DbId,
    pub attachments: Option<Vec<CreateAttachment>>,
}

/// DTO for updating a task.
///
/// `assigned_by`, `status_id`, and `project_id` are deliberately absent:
/// status changes go through the review endpoint and a task never changes
/// assigner or project.
#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority_id: Option<i16>,
    pub deadline: Option<Timestamp>,
    pub assigned_to: Option<DbId>,
}

/// An attachment accepted during a transaction whose bytes still need to
/// be moved into object storage after commit.
#[derive(Debug, Clone)]
pub struct QueuedUpload {
    pub object_key: String,
    pub content_type: Option<String>,
    pub file_path: String,
}

/// Result of a committed task creation, carried to the post-commit
/// fan-out (email enqueue, WebSocket push, file upload jobs).
#[derive(Debug, Clone)]
pub struct CreatedTask {
    pub task: Task,
    pub project_title: String,
    pub notification_title: String,
    pub notification_message: String,
    pub template_kind: &'static str,
    pub assignee_user_id: DbId,
    pub assignee_email: String,
    pub assigner_user_id: DbId,
    pub uploads: Vec<QueuedUpload>,
}

/// Result of a committed status change, carried to the post-commit
/// fan-out (email enqueue + WebSocket push).
#[derive(Debug, Clone)]
pub struct StatusChangeRecord {
    pub task: Task,
    pub project_title: String,
    pub notification_title: String,
    pub notification_message: String,
    pub template_kind: &'static str,
    /// User the notification row was addressed to. `None` when the
    /// affected party does not exist (e.g. a rejected task with no
    /// assignee) and no row was written.
    pub receiver_user_id: Option<DbId>,
    pub receiver_email: Option<String>,
    pub actor_user_id: Option<DbId>,
}

/// Result of a committed reassignment: the task plus one fan-out record
/// per notified party (previous assignee, new assignee).
#[derive(Debug, Clone)]
pub struct ReassignmentRecord {
    pub task: Task,
    pub project_title: String,
    pub notices: Vec<ReassignmentNotice>,
}

/// One notified party of a reassignment.
#[derive(Debug, Clone)]
pub struct ReassignmentNotice {
    pub user_id: DbId,
    pub email: String,
    pub title: String,
    pub message: String,
    pub template_kind: &'static str,
}
