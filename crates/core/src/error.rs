use crate::types::DbId;

/// Domain-level error taxonomy shared by every crate.
///
/// All validation and invariant errors are raised before or during the
/// owning database transaction, so any `Err` implies a full rollback.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
