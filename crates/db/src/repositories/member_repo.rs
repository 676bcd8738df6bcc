//! Repository for the `project_members` table.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::member::{AddMember, MemberWithUser, ProjectMember, UpdateMember};

/// Column list for `project_members` queries.
const COLUMNS: &str = "\
    id, user_id, project_id, role_id, position, busy_level_id, created_at";

/// Column list for member-with-user joins (aliased to `m`/`u`).
const JOINED_COLUMNS: &str = "\
    m.id, m.user_id, m.project_id, m.role_id, m.position, m.busy_level_id, \
    u.display_name, u.email";

/// Provides CRUD operations for project membership.
pub struct MemberRepo;

impl MemberRepo {
    /// Add a user to a project. The unique index on (project_id, user_id)
    /// rejects duplicate membership.
    pub async fn add(
        pool: &PgPool,
        project_id: DbId,
        input: &AddMember,
    ) -> Result<ProjectMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_members (user_id, project_id, role_id, position) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(input.user_id)
            .bind(project_id)
            .bind(input.role_id)
            .bind(&input.position)
            .fetch_one(pool)
            .await
    }

    /// Find a member by ID, constrained to a project. Used to verify that
    /// an assignment target actually belongs to the task's project.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        member_id: DbId,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_members \
             WHERE id = $1 AND project_id = $2"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(member_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a member joined with its user record.
    pub async fn find_with_user(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Option<MemberWithUser>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM project_members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.id = $1"
        );
        sqlx::query_as::<_, MemberWithUser>(&query)
            .bind(member_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's members joined with their user records.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM project_members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.project_id = $1 \
             ORDER BY m.id"
        );
        sqlx::query_as::<_, MemberWithUser>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a member's role, position, or busy level.
    pub async fn update(
        pool: &PgPool,
        member_id: DbId,
        input: &UpdateMember,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "UPDATE project_members SET \
                 role_id = COALESCE($2, role_id), \
                 position = COALESCE($3, position), \
                 busy_level_id = COALESCE($4, busy_level_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(member_id)
            .bind(input.role_id)
            .bind(&input.position)
            .bind(input.busy_level_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a member from their project. Returns `true` if a row was
    /// deleted.
    pub async fn remove(pool: &PgPool, member_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_members WHERE id = $1")
            .bind(member_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
