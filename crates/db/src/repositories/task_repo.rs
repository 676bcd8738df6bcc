//! Repository for the `tasks` table and its transactional lifecycle.
//!
//! Every status-changing operation runs inside one transaction that also
//! appends the `task_history` row and inserts the receiver's notification,
//! so a committed state change is never observable without its ledger
//! entry and in-app notification, and a rollback leaves no trace of any of
//! them. External effects (email jobs, WebSocket pushes, file uploads)
//! happen strictly after commit and are driven by the records these
//! methods return.

use sqlx::PgPool;
use stride_core::status::{Priority, TaskStatus};
use stride_core::types::{DbId, Timestamp};
use stride_core::workflow::{self, NotifyParty, ReviewOutcome};

use crate::models::task::{
    CreateTask, CreatedTask, QueuedUpload, ReassignmentNotice, ReassignmentRecord,
    StatusChangeRecord, Task, TaskParties, UpdateTask,
};

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, project_id, sprint_id, title, description, priority_id, deadline, \
    status_id, assigned_by, assigned_to, created_at, updated_at";

/// Join selecting a task with both parties and its project, for
/// notification composition. Bind $1 = task id.
const PARTIES_QUERY: &str = "\
    SELECT t.id AS task_id, t.title AS task_title, t.status_id, \
           p.id AS project_id, p.title AS project_title, \
           am.id AS assigner_member_id, au.id AS assigner_user_id, \
           au.display_name AS assigner_name, au.email AS assigner_email, \
           tm.id AS assignee_member_id, tu.id AS assignee_user_id, \
           tu.display_name AS assignee_name, tu.email AS assignee_email \
    FROM tasks t \
    JOIN projects p ON p.id = t.project_id \
    JOIN project_members am ON am.id = t.assigned_by \
    JOIN users au ON au.id = am.user_id \
    LEFT JOIN project_members tm ON tm.id = t.assigned_to \
    LEFT JOIN users tu ON tu.id = tm.user_id \
    WHERE t.id = $1";

/// Default page size for task listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for task listing.
const MAX_LIMIT: i64 = 200;

/// Query parameters for task listing.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TaskListQuery {
    pub sprint_id: Option<DbId>,
    pub status_id: Option<i16>,
    pub assigned_to: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Provides CRUD and lifecycle operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Create a task together with its initial `ongoing` history row and
    /// the assignee's notification, in one transaction.
    ///
    /// Attachment metadata rows are inserted here too, keyed by generated
    /// object keys; the returned [`CreatedTask::uploads`] drive the
    /// post-commit file queue publishes. Deadline and membership
    /// validation happen before this is called.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<CreatedTask, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO tasks \
                 (project_id, sprint_id, title, description, priority_id, deadline, \
                  assigned_by, assigned_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(input.sprint_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority_id.unwrap_or(Priority::Middle.id()))
            .bind(input.deadline)
            .bind(input.assigned_by)
            .bind(input.assigned_to)
            .fetch_one(&mut *tx)
            .await?;

        // Initial ledger entry: the creation itself.
        sqlx::query("INSERT INTO task_history (task_id, status_id) VALUES ($1, $2)")
            .bind(task.id)
            .bind(TaskStatus::Ongoing.id())
            .execute(&mut *tx)
            .await?;

        // Resolve the assignee's user and the project title for the
        // notification text and the post-commit email.
        let (assignee_user_id, assignee_email, project_title): (DbId, String, String) =
            sqlx::query_as(
                "SELECT u.id, u.email, p.title \
                 FROM project_members m \
                 JOIN users u ON u.id = m.user_id \
                 JOIN projects p ON p.id = m.project_id \
                 WHERE m.id = $1",
            )
            .bind(input.assigned_to)
            .fetch_one(&mut *tx)
            .await?;

        let (assigner_user_id,): (DbId,) =
            sqlx::query_as("SELECT user_id FROM project_members WHERE id = $1")
                .bind(input.assigned_by)
                .fetch_one(&mut *tx)
                .await?;

        let content = workflow::compose_assignment(&task.title, &project_title);
        sqlx::query("INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)")
            .bind(assignee_user_id)
            .bind(&content.title)
            .bind(&content.message)
            .execute(&mut *tx)
            .await?;

        let mut uploads = Vec::new();
        if let Some(attachments) = &input.attachments {
            for attachment in attachments {
                let object_key = format!("tasks/{}/{}", task.id, uuid::Uuid::new_v4());
                sqlx::query(
                    "INSERT INTO task_attachments (task_id, object_key, file_name, content_type) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(task.id)
                .bind(&object_key)
                .bind(&attachment.file_name)
                .bind(&attachment.content_type)
                .execute(&mut *tx)
                .await?;

                uploads.push(QueuedUpload {
                    object_key,
                    content_type: attachment.content_type.clone(),
                    file_path: attachment.file_path.clone(),
                });
            }
        }

        tx.commit().await?;

        Ok(CreatedTask {
            task,
            project_title,
            notification_title: content.title,
            notification_message: content.message,
            template_kind: content.template.kind(),
            assignee_user_id,
            assignee_email,
            assigner_user_id,
            uploads,
        })
    }

    /// Apply a review transition to a task.
    ///
    /// In one transaction: lock the task row (`FOR UPDATE` serializes
    /// concurrent transitions on the same task), write the new status,
    /// append the history row with the reviewer's comment, and insert the
    /// notification addressed to the non-acting party. Returns `None` if
    /// the task does not exist. Target validation
    /// ([`ReviewOutcome::from_status`]) happens before this is called.
    pub async fn change_status(
        pool: &PgPool,
        task_id: DbId,
        outcome: ReviewOutcome,
        comment: Option<&str>,
        actor_name: &str,
    ) -> Result<Option<StatusChangeRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let parties_query = format!("{PARTIES_QUERY} FOR UPDATE OF t");
        let Some(parties) = sqlx::query_as::<_, TaskParties>(&parties_query)
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE tasks SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .bind(outcome.status().id())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO task_history (task_id, status_id, comment) VALUES ($1, $2, $3)")
            .bind(task_id)
            .bind(outcome.status().id())
            .bind(comment)
            .execute(&mut *tx)
            .await?;

        let content = workflow::compose_status_change(outcome, &parties.task_title, actor_name);

        let (receiver_user_id, receiver_email, actor_user_id) = match content.receiver {
            NotifyParty::Assigner => (
                Some(parties.assigner_user_id),
                Some(parties.assigner_email.clone()),
                parties.assignee_user_id,
            ),
            NotifyParty::Assignee => (
                parties.assignee_user_id,
                parties.assignee_email.clone(),
                Some(parties.assigner_user_id),
            ),
        };

        if let Some(user_id) = receiver_user_id {
            sqlx::query("INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(&content.title)
                .bind(&content.message)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Some(StatusChangeRecord {
            task,
            project_title: parties.project_title,
            notification_title: content.title,
            notification_message: content.message,
            template_kind: content.template.kind(),
            receiver_user_id,
            receiver_email,
            actor_user_id,
        }))
    }

    /// Update a task's plain fields. Reassignment goes through
    /// [`TaskRepo::reassign`]; status changes through
    /// [`TaskRepo::change_status`].
    pub async fn update(
        pool: &PgPool,
        task_id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 priority_id = COALESCE($4, priority_id), \
                 deadline = COALESCE($5, deadline), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority_id)
            .bind(input.deadline)
            .fetch_optional(pool)
            .await
    }

    /// Reassign a task to another member.
    ///
    /// In one transaction: lock and load the parties, move `assigned_to`,
    /// and insert one notification for the previous assignee (removal)
    /// and one for the new assignee. Both post-commit emails are carried
    /// in the returned record. Returns `None` if the task does not exist.
    /// The new assignee's membership is validated before this is called.
    pub async fn reassign(
        pool: &PgPool,
        task_id: DbId,
        new_assignee: DbId,
    ) -> Result<Option<ReassignmentRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let parties_query = format!("{PARTIES_QUERY} FOR UPDATE OF t");
        let Some(parties) = sqlx::query_as::<_, TaskParties>(&parties_query)
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE tasks SET assigned_to = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .bind(new_assignee)
            .fetch_one(&mut *tx)
            .await?;

        let mut notices = Vec::new();

        // Notify the previous assignee of the removal, unless the task
        // was unassigned or is being "reassigned" to the same member.
        if let (Some(old_member), Some(old_user), Some(old_email)) = (
            parties.assignee_member_id,
            parties.assignee_user_id,
            parties.assignee_email.clone(),
        ) {
            if old_member != new_assignee {
                let content =
                    workflow::compose_unassignment(&parties.task_title, &parties.project_title);
                sqlx::query(
                    "INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)",
                )
                .bind(old_user)
                .bind(&content.title)
                .bind(&content.message)
                .execute(&mut *tx)
                .await?;

                notices.push(ReassignmentNotice {
                    user_id: old_user,
                    email: old_email,
                    title: content.title,
                    message: content.message,
                    template_kind: content.template.kind(),
                });
            }
        }

        if parties.assignee_member_id != Some(new_assignee) {
            let (new_user_id, new_email): (DbId, String) = sqlx::query_as(
                "SELECT u.id, u.email FROM project_members m \
                 JOIN users u ON u.id = m.user_id \
                 WHERE m.id = $1",
            )
            .bind(new_assignee)
            .fetch_one(&mut *tx)
            .await?;

            let content =
                workflow::compose_reassignment(&parties.task_title, &parties.project_title);
            sqlx::query("INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)")
                .bind(new_user_id)
                .bind(&content.title)
                .bind(&content.message)
                .execute(&mut *tx)
                .await?;

            notices.push(ReassignmentNotice {
                user_id: new_user_id,
                email: new_email,
                title: content.title,
                message: content.message,
                template_kind: content.template.kind(),
            });
        }

        tx.commit().await?;

        Ok(Some(ReassignmentRecord {
            task,
            project_title: parties.project_title,
            notices,
        }))
    }

    /// Delete a task, returning the object keys of its attachments so the
    /// caller can queue storage removal after the delete commits.
    ///
    /// History, comments, attachments, and time entries go with the task
    /// via `ON DELETE CASCADE`. Returns `None` if the task did not exist.
    /// The assigner-only permission check happens before this is called.
    pub async fn delete(pool: &PgPool, task_id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let keys: Vec<String> =
            sqlx::query_scalar("SELECT object_key FROM task_attachments WHERE task_id = $1")
                .bind(task_id)
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(keys))
        }
    }

    /// Transition every task past its deadline into `overdue`, appending
    /// one history row per affected task.
    ///
    /// Runs as a single statement, so the sweep commits or rolls back as
    /// a whole. Tasks already `overdue` or `closed` are excluded by the
    /// status filter, which is what makes a rerun a no-op. Returns the
    /// affected task IDs.
    pub async fn sweep_overdue(pool: &PgPool, now: Timestamp) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "WITH swept AS ( \
                 UPDATE tasks \
                 SET status_id = $1, updated_at = NOW() \
                 WHERE deadline < $2 AND status_id IN ($3, $4, $5) \
                 RETURNING id \
             ) \
             INSERT INTO task_history (task_id, status_id) \
             SELECT id, $1 FROM swept \
             RETURNING task_id",
        )
        .bind(TaskStatus::Overdue.id())
        .bind(now)
        .bind(TaskStatus::SWEEPABLE[0].id())
        .bind(TaskStatus::SWEEPABLE[1].id())
        .bind(TaskStatus::SWEEPABLE[2].id())
        .fetch_all(pool)
        .await
    }

    /// Find a task by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's tasks with optional sprint/status/assignee
    /// filters and pagination, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        params: &TaskListQuery,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions = vec!["project_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.sprint_id.is_some() {
            conditions.push(format!("sprint_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.assigned_to.is_some() {
            conditions.push(format!("assigned_to = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(project_id);
        if let Some(sprint_id) = params.sprint_id {
            q = q.bind(sprint_id);
        }
        if let Some(status_id) = params.status_id {
            q = q.bind(status_id);
        }
        if let Some(assigned_to) = params.assigned_to {
            q = q.bind(assigned_to);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}
