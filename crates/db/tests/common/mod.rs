//! Shared fixtures for repository integration tests.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use stride_core::roles::Role;
use stride_core::types::{DbId, Timestamp};
use stride_db::models::member::AddMember;
use stride_db::models::project::CreateProject;
use stride_db::models::sprint::CreateSprint;
use stride_db::models::task::CreateTask;
use stride_db::models::user::CreateUser;
use stride_db::repositories::{MemberRepo, ProjectRepo, SprintRepo, UserRepo};

/// A seeded project with a manager, a developer, and one open sprint.
pub struct Fixture {
    pub project_id: DbId,
    pub lead_user: DbId,
    pub lead_member: DbId,
    pub dev_user: DbId,
    pub dev_member: DbId,
    pub sprint_id: DbId,
}

/// Seed the standard fixture: two users, one project, two members, one
/// sprint running from an hour ago to two weeks out.
pub async fn seed(pool: &PgPool) -> Fixture {
    seed_as(pool, "core").await
}

/// Like [`seed`], with an email prefix so a test can build several
/// independent projects without tripping the unique email index.
pub async fn seed_as(pool: &PgPool, prefix: &str) -> Fixture {
    let lead = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{prefix}.lead@example.com"),
            display_name: "Lena Lead".to_string(),
        },
    )
    .await
    .unwrap();

    let dev = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{prefix}.dev@example.com"),
            display_name: "Devin Dev".to_string(),
        },
    )
    .await
    .unwrap();

    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            title: "Apollo".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let lead_member = MemberRepo::add(
        pool,
        project.id,
        &AddMember {
            user_id: lead.id,
            role_id: Role::Manager.id(),
            position: Some("Team lead".to_string()),
        },
    )
    .await
    .unwrap();

    let dev_member = MemberRepo::add(
        pool,
        project.id,
        &AddMember {
            user_id: dev.id,
            role_id: Role::Member.id(),
            position: Some("Backend".to_string()),
        },
    )
    .await
    .unwrap();

    let sprint = SprintRepo::create(
        pool,
        project.id,
        &CreateSprint {
            title: "Sprint 1".to_string(),
            description: None,
            created_by: lead_member.id,
            start_date: Utc::now() - Duration::hours(1),
            end_date: Utc::now() + Duration::days(14),
        },
    )
    .await
    .unwrap();

    Fixture {
        project_id: project.id,
        lead_user: lead.id,
        lead_member: lead_member.id,
        dev_user: dev.id,
        dev_member: dev_member.id,
        sprint_id: sprint.id,
    }
}

/// A task assigned by the lead to the developer.
pub fn new_task(fixture: &Fixture, title: &str, deadline: Timestamp) -> CreateTask {
    CreateTask {
        sprint_id: fixture.sprint_id,
        title: title.to_string(),
        description: None,
        priority_id: None,
        deadline,
        assigned_by: fixture.lead_member,
        assigned_to: fixture.dev_member,
        attachments: None,
    }
}
