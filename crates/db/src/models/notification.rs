//! Notification entity model.
//!
//! Rows are produced by lifecycle events (never directly by users) and are
//! inserted inside the same transaction as the state change that triggered
//! them, so a committed transition always has its notification and a
//! rolled-back one never does.

use serde::Serialize;
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    pub is_viewed: bool,
    pub created_at: Timestamp,
}
