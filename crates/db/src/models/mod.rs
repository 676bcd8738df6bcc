//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod attachment;
pub mod comment;
pub mod member;
pub mod notification;
pub mod project;
pub mod sprint;
pub mod summary;
pub mod task;
pub mod time_entry;
pub mod user;
