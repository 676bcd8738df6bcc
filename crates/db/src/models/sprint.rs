//! Sprint entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `sprints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sprint {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status_id: i16,
    pub created_by: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a sprint.
#[derive(Debug, Deserialize)]
pub struct CreateSprint {
    pub title: String,
    pub description: Option<String>,
    pub created_by: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// DTO for updating a sprint. Date changes are validated against the
/// unchanged bound before this reaches the repository.
#[derive(Debug, Deserialize)]
pub struct UpdateSprint {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status_id: Option<i16>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}
