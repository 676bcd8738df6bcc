//! Repository for the `time_entries` table.
//!
//! A user may have at most one running timer (`end_time IS NULL`) across
//! all tasks. The service layer rejects a second start with a conflict
//! after checking [`TimeEntryRepo::find_running`]; the partial unique
//! index `uq_time_entries_one_running_per_user` serializes the race two
//! concurrent starts would otherwise win together.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::time_entry::{StartTimer, TimeEntry};

/// Column list for `time_entries` queries.
const COLUMNS: &str = "\
    id, user_id, task_id, start_time, end_time, duration_secs, note, created_at";

/// Provides timer operations for time entries.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Start a timer for a user on a task.
    pub async fn start(
        pool: &PgPool,
        user_id: DbId,
        input: &StartTimer,
    ) -> Result<TimeEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_entries (user_id, task_id, note) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .bind(input.task_id)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    /// Find the user's running timer, if any.
    pub async fn find_running(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries \
             WHERE user_id = $1 AND end_time IS NULL"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Stop the user's running timer, computing its duration.
    ///
    /// Returns `None` when no timer is running; the caller maps that to
    /// a conflict.
    pub async fn stop(pool: &PgPool, user_id: DbId) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE time_entries \
             SET end_time = NOW(), \
                 duration_secs = EXTRACT(EPOCH FROM NOW() - start_time)::BIGINT \
             WHERE user_id = $1 AND end_time IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a task's time entries, newest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries \
             WHERE task_id = $1 \
             ORDER BY start_time DESC"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's time entries, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries \
             WHERE user_id = $1 \
             ORDER BY start_time DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
