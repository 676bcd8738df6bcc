//! WebSocket infrastructure: connection registry, channel handlers, and
//! the heartbeat task.
//!
//! Two channels exist: a task channel (`/ws/tasks/{id}`) that receives
//! comment broadcasts for one task, and a notification channel
//! (`/ws/notifications/{user_id}`) that receives the user's in-app
//! notifications. Frames are best-effort: nothing is persisted or
//! replayed for disconnected clients.

pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use handler::{ws_notifications_handler, ws_task_handler};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
