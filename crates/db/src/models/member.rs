//! Project member entity models and DTOs.
//!
//! The member (not the user) is the actor identity throughout the task and
//! sprint lifecycle: assignment, permissions, and history are all
//! project-scoped.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `project_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub role_id: i16,
    pub position: Option<String>,
    pub busy_level_id: i16,
    pub created_at: Timestamp,
}

/// A member joined with its user record, for listings and notification
/// addressing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub role_id: i16,
    pub position: Option<String>,
    pub busy_level_id: i16,
    pub display_name: String,
    pub email: String,
}

/// DTO for adding a member to a project.
#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub user_id: DbId,
    pub role_id: i16,
    pub position: Option<String>,
}

/// DTO for updating a member.
#[derive(Debug, Deserialize)]
pub struct UpdateMember {
    pub role_id: Option<i16>,
    pub position: Option<String>,
    pub busy_level_id: Option<i16>,
}
