use std::sync::Arc;

use stride_events::{EventBus, QueuePublisher};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stride_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection registry (task and notification channels).
    pub ws_manager: Arc<WsManager>,
    /// Event bus for post-commit lifecycle events.
    pub event_bus: Arc<EventBus>,
    /// Queue gateway publisher; `None` when `QUEUE_GATEWAY_URL` is not
    /// configured (publishes are skipped with a debug log).
    pub queue: Option<Arc<QueuePublisher>>,
}
