//! Error types for the permissions module.

use custodia_core::{Action, EntityRef, ErrorKind, Principal, ValidationError};
use custodia_store::StoreError;
use thiserror::Error;

/// Errors that can occur during permission operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The actor may not perform the action on the entity.
    #[error("access denied: {actor} may not {action} entity {entity_ref}")]
    AccessDenied {
        entity_ref: EntityRef,
        actor: Principal,
        action: Action,
    },

    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(EntityRef),

    /// Malformed grant request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl PermsError {
    /// The taxonomy kind, or `None` for storage failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PermsError::AccessDenied { .. } => Some(ErrorKind::AccessDenied),
            PermsError::NotFound(_) => Some(ErrorKind::NotFound),
            PermsError::Validation(e) => Some(e.kind()),
            PermsError::Store(StoreError::Conflict(_)) => Some(ErrorKind::Conflict),
            PermsError::Store(_) => None,
        }
    }
}

impl From<StoreError> for PermsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(entity_ref) => PermsError::NotFound(entity_ref),
            other => PermsError::Store(other),
        }
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
