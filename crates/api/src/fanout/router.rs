//! Event-to-delivery routing for committed lifecycle events.
//!
//! Consumes [`DomainEvent`]s from the broadcast channel and, for each one,
//! enqueues the carried email job (skipping self-notification) and pushes
//! a JSON frame to the matching WebSocket channel. Both effects are
//! best-effort: failures are logged with operation context and never
//! surface to the request that committed the state change.

use std::sync::Arc;

use axum::extract::ws::Message;
use stride_events::{DomainEvent, QueuePublisher};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes committed lifecycle events to their external effects.
pub struct FanoutRouter {
    ws_manager: Arc<WsManager>,
    queue: Option<Arc<QueuePublisher>>,
}

impl FanoutRouter {
    /// Create a new router. `queue = None` (gateway unconfigured) skips
    /// email enqueueing with a debug log.
    pub fn new(ws_manager: Arc<WsManager>, queue: Option<Arc<QueuePublisher>>) -> Self {
        Self { ws_manager, queue }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](stride_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Fan-out router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, fan-out router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event: email enqueue, then WebSocket push.
    async fn route_event(&self, event: &DomainEvent) {
        self.enqueue_email(event).await;
        self.push_websocket(event).await;
    }

    /// Enqueue the event's email job, unless the receiver acted on their
    /// own task (self-notification carries no email).
    async fn enqueue_email(&self, event: &DomainEvent) {
        let Some(job) = &event.email else {
            return;
        };

        let is_self = event.actor_user_id.is_some()
            && event.actor_user_id == event.receiver_user_id;
        if is_self {
            tracing::debug!(
                event_type = %event.event_type,
                "Actor and receiver are identical, skipping email"
            );
            return;
        }

        let Some(queue) = &self.queue else {
            tracing::debug!(
                event_type = %event.event_type,
                "Queue gateway not configured, skipping email enqueue"
            );
            return;
        };

        if let Err(e) = queue.publish_email(job).await {
            tracing::error!(
                error = %e,
                event_type = %event.event_type,
                task_id = ?event.task_id,
                receiver_user_id = ?event.receiver_user_id,
                kind = %job.kind,
                "Failed to enqueue notification email"
            );
        }
    }

    /// Push the event to the matching WebSocket channel: task channel for
    /// comment events, otherwise the receiver's notification channel.
    async fn push_websocket(&self, event: &DomainEvent) {
        let frame = serde_json::json!({
            "type": event.event_type,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });
        let message = Message::Text(frame.to_string().into());

        if event.event_type.starts_with("comment.") {
            if let Some(task_id) = event.task_id {
                let sent = self.ws_manager.send_to_task(task_id, message).await;
                tracing::debug!(task_id, sent, event_type = %event.event_type, "Task channel push");
            }
            return;
        }

        if let Some(user_id) = event.receiver_user_id {
            let sent = self.ws_manager.send_to_user(user_id, message).await;
            tracing::debug!(user_id, sent, event_type = %event.event_type, "Notification push");
        }
    }
}
