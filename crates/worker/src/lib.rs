//! Stride email worker.
//!
//! Consumes queued email jobs from the queue gateway and delivers them
//! via SMTP. Delivery is at-least-once: a job is acked only after a
//! successful send, nacked (no requeue) on permanent failure, and left
//! for redelivery on transient failure.

pub mod consumer;
