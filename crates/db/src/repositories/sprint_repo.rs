//! Repository for the `sprints` table.
//!
//! Date-range and activation validation happen in the service layer with
//! the rules from `stride_core::sprint`; the partial unique index
//! `uq_sprints_one_active_per_project` is the serialization backstop for
//! concurrent activations (violations surface as unique-constraint
//! conflicts).

use sqlx::PgPool;
use stride_core::sprint::SprintCandidate;
use stride_core::status::SprintStatus;
use stride_core::types::DbId;

use crate::models::sprint::{CreateSprint, Sprint, UpdateSprint};

/// Column list for `sprints` queries.
const COLUMNS: &str = "\
    id, project_id, title, description, status_id, created_by, \
    start_date, end_date, created_at, updated_at";

/// Provides CRUD operations for sprints.
pub struct SprintRepo;

impl SprintRepo {
    /// Create a sprint in `planned` status.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateSprint,
    ) -> Result<Sprint, sqlx::Error> {
        let query = format!(
            "INSERT INTO sprints \
                 (project_id, title, description, created_by, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.created_by)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a sprint by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sprint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sprints WHERE id = $1");
        sqlx::query_as::<_, Sprint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's sprints, newest start date first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Sprint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sprints \
             WHERE project_id = $1 \
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Find the currently active sprint of a project, if any. At most one
    /// exists by the partial unique index.
    pub async fn find_active(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Sprint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sprints \
             WHERE project_id = $1 AND status_id = $2"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(project_id)
            .bind(SprintStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update. Callers validate date ordering (against the
    /// unchanged bound for one-sided changes) and the single-active-sprint
    /// rule before calling.
    pub async fn update(
        pool: &PgPool,
        sprint_id: DbId,
        input: &UpdateSprint,
    ) -> Result<Option<Sprint>, sqlx::Error> {
        let query = format!(
            "UPDATE sprints SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 status_id = COALESCE($4, status_id), \
                 start_date = COALESCE($5, start_date), \
                 end_date = COALESCE($6, end_date), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(sprint_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sprint, returning the object keys of every attachment on
    /// its tasks so the caller can queue storage removal after commit.
    ///
    /// Tasks (and through them history, comments, attachments, time
    /// entries) go with the sprint via `ON DELETE CASCADE`. Returns
    /// `None` if the sprint did not exist.
    pub async fn delete(
        pool: &PgPool,
        sprint_id: DbId,
    ) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT a.object_key \
             FROM task_attachments a \
             JOIN tasks t ON t.id = a.task_id \
             WHERE t.sprint_id = $1",
        )
        .bind(sprint_id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM sprints WHERE id = $1")
            .bind(sprint_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(keys))
        }
    }

    /// Resolve a project's default sprint: the most recently created
    /// active sprint, else the sprint with the latest end date, else
    /// `None` (a project without sprints is not an error).
    pub async fn find_default(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Sprint>, sqlx::Error> {
        let sprints = Self::list_by_project(pool, project_id).await?;

        let candidates: Vec<SprintCandidate> = sprints
            .iter()
            .filter_map(|s| {
                SprintStatus::from_id(s.status_id).map(|status| SprintCandidate {
                    id: s.id,
                    status,
                    created_at: s.created_at,
                    end_date: s.end_date,
                })
            })
            .collect();

        let picked = stride_core::sprint::pick_default(&candidates);
        Ok(picked.and_then(|id| sprints.into_iter().find(|s| s.id == id)))
    }
}
