//! Stride HTTP API.
//!
//! Axum handlers over the repository layer, the two WebSocket channels
//! (task comments, user notifications), the post-commit notification
//! fan-out router, and the scheduled background jobs (overdue sweeper,
//! daily report).

pub mod background;
pub mod config;
pub mod error;
pub mod fanout;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;
pub mod ws;
