//! Post-commit notification fan-out.
//!
//! The [`FanoutRouter`] subscribes to the event bus and performs the
//! external half of every lifecycle notification: enqueueing the templated
//! email job and pushing live WebSocket frames. The durable half (task
//! row, history entry, notification row) is already committed by the time
//! an event reaches this module.

pub mod router;

pub use router::FanoutRouter;
