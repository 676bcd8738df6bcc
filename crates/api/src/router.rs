//! Route table.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", post(handlers::users::create_user))
        .route("/users/{id}", get(handlers::users::get_user))
        // Projects
        .route(
            "/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::get_project)
                .patch(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        // Members
        .route(
            "/projects/{id}/members",
            post(handlers::members::add_member).get(handlers::members::list_members),
        )
        .route(
            "/members/{id}",
            patch(handlers::members::update_member).delete(handlers::members::remove_member),
        )
        // Sprints
        .route(
            "/projects/{id}/sprints",
            post(handlers::sprints::create_sprint).get(handlers::sprints::list_sprints),
        )
        .route(
            "/projects/{id}/sprints/default",
            get(handlers::sprints::get_default_sprint),
        )
        .route(
            "/sprints/{id}",
            get(handlers::sprints::get_sprint)
                .patch(handlers::sprints::update_sprint)
                .delete(handlers::sprints::delete_sprint),
        )
        // Tasks
        .route(
            "/projects/{id}/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/status", post(handlers::tasks::change_status))
        .route("/tasks/{id}/history", get(handlers::tasks::get_history))
        // Attachments
        .route(
            "/tasks/{id}/attachments",
            post(handlers::tasks::add_attachment).get(handlers::tasks::list_attachments),
        )
        .route(
            "/tasks/{id}/attachments/{attachment_id}",
            delete(handlers::tasks::remove_attachment),
        )
        // Comments
        .route(
            "/tasks/{id}/comments",
            post(handlers::comments::create_comment).get(handlers::comments::list_comments),
        )
        .route(
            "/comments/{id}",
            delete(handlers::comments::delete_comment),
        )
        // Notifications
        .route(
            "/users/{id}/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/users/{user_id}/notifications/{id}/viewed",
            post(handlers::notifications::mark_viewed),
        )
        .route(
            "/users/{id}/notifications/viewed",
            post(handlers::notifications::mark_all_viewed),
        )
        .route(
            "/users/{id}/notifications/unviewed_count",
            get(handlers::notifications::unviewed_count),
        )
        // Time tracking
        .route(
            "/users/{id}/timer/start",
            post(handlers::time_entries::start_timer),
        )
        .route(
            "/users/{id}/timer/stop",
            post(handlers::time_entries::stop_timer),
        )
        .route(
            "/tasks/{id}/time_entries",
            get(handlers::time_entries::list_for_task),
        )
        .route(
            "/users/{id}/time_entries",
            get(handlers::time_entries::list_for_user),
        )
        // Summary / productivity
        .route(
            "/projects/{id}/summary/status",
            get(handlers::summary::status_overview),
        )
        .route(
            "/projects/{id}/summary/workload",
            get(handlers::summary::team_workload),
        )
        .route(
            "/projects/{id}/summary/sprints",
            get(handlers::summary::sprint_progress),
        )
        .route(
            "/projects/{id}/summary/priorities",
            get(handlers::summary::priority_breakdown),
        )
        .route(
            "/projects/{id}/summary/activity",
            get(handlers::summary::recent_activity),
        )
        .route(
            "/projects/{id}/summary/productivity",
            get(handlers::summary::member_productivity),
        )
        .route(
            "/projects/{id}/members/{member_id}/productivity",
            get(handlers::summary::member_score),
        )
}

/// Build the WebSocket routes (outside `/api/v1`).
pub fn ws_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/tasks/{id}", get(ws::ws_task_handler))
        .route("/ws/notifications/{id}", get(ws::ws_notifications_handler))
}

/// Build the health route.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
