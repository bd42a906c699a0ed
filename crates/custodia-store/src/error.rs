//! Error types for the store module.

use custodia_core::EntityRef;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Tag list serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(EntityRef),

    /// A record already exists under a freshly allocated ref.
    #[error("entity {0} already exists")]
    Conflict(EntityRef),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Lock poisoning or a failed blocking task.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
