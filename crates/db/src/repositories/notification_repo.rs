//! Repository for the `notifications` table.
//!
//! Lifecycle inserts are done by `TaskRepo` inside the producing
//! transaction; this repository covers the read/ack surface of the
//! notification bell.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, title, message, is_viewed, created_at";

/// Provides read and acknowledgement operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// List notifications for a user.
    ///
    /// When `unviewed_only` is `true`, only notifications with
    /// `is_viewed = false` are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unviewed_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unviewed_only {
            "AND is_viewed = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as viewed.
    ///
    /// Returns `true` if the notification was found for the given user and
    /// updated, `false` otherwise.
    pub async fn mark_viewed(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_viewed = true \
             WHERE id = $1 AND user_id = $2 AND is_viewed = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unviewed notifications as viewed for a user.
    ///
    /// Returns the number of notifications that were marked.
    pub async fn mark_all_viewed(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_viewed = true \
             WHERE user_id = $1 AND is_viewed = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unviewed notifications for a user.
    pub async fn unviewed_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_viewed = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
