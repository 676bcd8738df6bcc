//! Stride domain core.
//!
//! Pure domain types and rules shared by every other crate: ID and
//! timestamp aliases, the error taxonomy, status/priority/role enums, the
//! task review workflow, sprint time-range rules, and productivity math.
//! Nothing in this crate performs I/O.

pub mod error;
pub mod productivity;
pub mod roles;
pub mod sprint;
pub mod status;
pub mod types;
pub mod workflow;
