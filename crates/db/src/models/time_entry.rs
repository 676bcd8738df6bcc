//! Time entry entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `time_entries` table.
///
/// `end_time = NULL` means the timer is still running; `duration_secs` is
/// computed when the timer stops.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_secs: Option<i64>,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for starting a timer.
#[derive(Debug, Deserialize)]
pub struct StartTimer {
    pub task_id: DbId,
    pub note: Option<String>,
}
