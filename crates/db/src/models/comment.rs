//! Task comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `task_comments` table, joined with the author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskComment {
    pub id: DbId,
    pub task_id: DbId,
    pub author_id: DbId,
    pub author_name: String,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for posting a comment.
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub author_id: DbId,
    pub body: String,
}
