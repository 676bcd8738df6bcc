//! Stride event bus and outbound delivery infrastructure.
//!
//! This crate provides the post-commit side of the notification fan-out:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical lifecycle event envelope, published
//!   strictly after the owning database transaction commits.
//! - [`queue`] — JSON wire contracts for the email and file queues plus
//!   the HTTP gateway publisher.
//! - [`delivery`] — SMTP email delivery used by the queue consumer.

pub mod bus;
pub mod delivery;
pub mod queue;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use queue::{EmailJob, FileJob, QueueConfig, QueueError, QueuePublisher};
