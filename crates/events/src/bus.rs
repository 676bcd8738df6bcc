//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.
//! Lifecycle services publish only after their database transaction has
//! committed, so subscribers never observe an event for state that rolled
//! back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_core::types::DbId;
use tokio::sync::broadcast;

use crate::queue::EmailJob;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A committed lifecycle event.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_task`](DomainEvent::with_task),
/// [`with_project`](DomainEvent::with_project),
/// [`with_actor`](DomainEvent::with_actor),
/// [`with_receiver`](DomainEvent::with_receiver),
/// [`with_email`](DomainEvent::with_email), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"task.status_changed"`.
    pub event_type: String,

    /// Project the event belongs to.
    pub project_id: Option<DbId>,

    /// Task the event belongs to (drives the task WebSocket channel).
    pub task_id: Option<DbId>,

    /// User whose action produced the event.
    pub actor_user_id: Option<DbId>,

    /// User the in-app notification was addressed to (drives the user
    /// WebSocket channel and the email enqueue).
    pub receiver_user_id: Option<DbId>,

    /// Templated email job to enqueue for the receiver, if any.
    pub email: Option<EmailJob>,

    /// Free-form JSON payload pushed to WebSocket subscribers.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            project_id: None,
            task_id: None,
            actor_user_id: None,
            receiver_user_id: None,
            email: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the owning task.
    pub fn with_task(mut self, task_id: DbId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Attach the owning project.
    pub fn with_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Attach the acting user.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Attach the notified user.
    pub fn with_receiver(mut self, user_id: DbId) -> Self {
        self.receiver_user_id = Some(user_id);
        self
    }

    /// Attach the email job to enqueue after routing.
    pub fn with_email(mut self, email: EmailJob) -> Self {
        self.email = Some(email);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
///
/// # Usage
///
/// ```rust
/// use stride_events::bus::{DomainEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new("task.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the durable side effects (task row, history, notification) are
    /// already committed by the time anything is published here.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{EmailJob, EmailParams};

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DomainEvent::new("task.status_changed")
            .with_task(42)
            .with_project(7)
            .with_actor(3)
            .with_receiver(9)
            .with_payload(serde_json::json!({"status": "under_review"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "task.status_changed");
        assert_eq!(received.task_id, Some(42));
        assert_eq!(received.project_id, Some(7));
        assert_eq!(received.actor_user_id, Some(3));
        assert_eq!(received.receiver_user_id, Some(9));
        assert_eq!(received.payload["status"], "under_review");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new("sprint.updated"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "sprint.updated");
        assert_eq!(e2.event_type, "sprint.updated");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(DomainEvent::new("task.deleted"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DomainEvent::new("bare.event");
        assert_eq!(event.event_type, "bare.event");
        assert!(event.task_id.is_none());
        assert!(event.receiver_user_id.is_none());
        assert!(event.email.is_none());
        assert!(event.payload.is_object());
    }

    #[test]
    fn email_job_travels_with_the_event() {
        let job = EmailJob {
            kind: "task_closed".to_string(),
            to: "dev@example.com".to_string(),
            params: EmailParams {
                project_title: "Apollo".to_string(),
                task_title: "Fix login".to_string(),
                role: None,
                position: None,
                project_id: 7,
                page: "tasks".to_string(),
            },
        };
        let event = DomainEvent::new("task.status_changed").with_email(job);
        assert_eq!(event.email.as_ref().unwrap().kind, "task_closed");
    }
}
