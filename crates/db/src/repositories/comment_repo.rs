//! Repository for the `task_comments` table.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::comment::{CreateComment, TaskComment};

/// Column list for comment-with-author joins (aliased to `c`/`u`).
const JOINED_COLUMNS: &str = "\
    c.id, c.task_id, c.author_id, u.display_name AS author_name, c.body, c.created_at";

/// Provides CRUD operations for task comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Post a comment on a task, returning it joined with the author's
    /// name for immediate broadcast.
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        input: &CreateComment,
    ) -> Result<TaskComment, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO task_comments (task_id, author_id, body) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(task_id)
        .bind(input.author_id)
        .bind(&input.body)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM task_comments c \
             JOIN project_members m ON m.id = c.author_id \
             JOIN users u ON u.id = m.user_id \
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, TaskComment>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List a task's comments, oldest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskComment>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM task_comments c \
             JOIN project_members m ON m.id = c.author_id \
             JOIN users u ON u.id = m.user_id \
             WHERE c.task_id = $1 \
             ORDER BY c.created_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, TaskComment>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a comment if it belongs to the given author.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_own(
        pool: &PgPool,
        comment_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM task_comments WHERE id = $1 AND author_id = $2")
                .bind(comment_id)
                .bind(author_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
