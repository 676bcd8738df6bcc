//! Read operations for the `task_history` table.
//!
//! Inserts are done by `TaskRepo` inside the status-changing transaction
//! to ensure atomicity; the ledger has no standalone write path and no
//! update or delete path at all (rows disappear only with the task
//! cascade).

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::task::TaskHistoryEntry;

/// Column list for `task_history` queries.
const COLUMNS: &str = "id, task_id, status_id, comment, created_at";

/// Read access to the append-only task status ledger.
pub struct TaskHistoryRepo;

impl TaskHistoryRepo {
    /// Full history for a task, most recent first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TaskHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_history \
             WHERE task_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TaskHistoryEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent ledger entry for a task, i.e. its status as of now.
    pub async fn latest_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Option<TaskHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_history \
             WHERE task_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TaskHistoryEntry>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }
}
