//! Error types shared across the Deskgate crates.
//!
//! Expected permission denials are *not* errors — they travel as fields of
//! [`PermissionVerdict`](crate::models::verdict::PermissionVerdict). The
//! variants here cover write-path validation failures and infrastructure
//! faults.

use thiserror::Error;

/// A dependent entity count reported by [`CoreError::HasDependents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentCount {
    /// Entity kind, e.g. `"telegram_group"`.
    pub entity: &'static str,
    pub count: u64,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} ({key})")]
    AlreadyExists { entity: String, key: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Cannot delete {entity} {id}: dependent records exist")]
    HasDependents {
        entity: String,
        id: String,
        dependents: Vec<DependentCount>,
    },

    #[error("Store operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether this error means "the row was not there" as opposed to an
    /// infrastructure fault. Resolution stages use this to distinguish a
    /// clean denial from a failed lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}
