//! Task attachment metadata model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `task_attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskAttachment {
    pub id: DbId,
    pub task_id: DbId,
    pub object_key: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for attaching a file to a task.
///
/// `file_path` points at staged upload content; the storage worker moves
/// it under the generated object key after commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_path: String,
}
