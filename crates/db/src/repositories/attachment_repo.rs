//! Repository for the `task_attachments` table.
//!
//! Rows are metadata only; moving the bytes in and out of object storage
//! is the file queue's job and always happens after the metadata
//! transaction commits.

use sqlx::PgPool;
use stride_core::types::DbId;
use uuid::Uuid;

use crate::models::attachment::{CreateAttachment, TaskAttachment};

/// Column list for `task_attachments` queries.
const COLUMNS: &str = "id, task_id, object_key, file_name, content_type, created_at";

/// Provides CRUD operations for attachment metadata.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Attach a file to a task under a freshly generated object key.
    pub async fn add(
        pool: &PgPool,
        task_id: DbId,
        input: &CreateAttachment,
    ) -> Result<TaskAttachment, sqlx::Error> {
        let object_key = format!("tasks/{task_id}/{}", Uuid::new_v4());
        let query = format!(
            "INSERT INTO task_attachments (task_id, object_key, file_name, content_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskAttachment>(&query)
            .bind(task_id)
            .bind(&object_key)
            .bind(&input.file_name)
            .bind(&input.content_type)
            .fetch_one(pool)
            .await
    }

    /// List a task's attachments.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskAttachment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_attachments \
             WHERE task_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, TaskAttachment>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Detach a file from a task, returning its object key so the caller
    /// can queue storage removal. Returns `None` if no such attachment
    /// exists on the task.
    pub async fn remove(
        pool: &PgPool,
        task_id: DbId,
        attachment_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "DELETE FROM task_attachments \
             WHERE id = $1 AND task_id = $2 \
             RETURNING object_key",
        )
        .bind(attachment_id)
        .bind(task_id)
        .fetch_optional(pool)
        .await
    }
}
