//! Error types for the Registry.

use custodia_core::{Action, EntityRef, ErrorKind, Principal, ValidationError};
use custodia_perms::PermsError;
use custodia_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
///
/// One variant per [`ErrorKind`], plus [`RegistryError::Store`] for backend
/// failures that are not part of the taxonomy.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The caller lacks authority for the action.
    #[error("access denied: {actor} may not {action} entity {entity_ref}")]
    AccessDenied {
        entity_ref: EntityRef,
        actor: Principal,
        action: Action,
    },

    /// Designation, fingerprint or accessor out of shape.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(EntityRef),

    /// A backend observed a duplicate entity ref.
    #[error("entity ref already allocated: {0}")]
    Conflict(EntityRef),

    /// Abstract or tags out of shape.
    #[error("corrupt {field}: {reason}")]
    MetadataCorrupt { field: &'static str, reason: String },

    /// Unknown tier.
    #[error("unknown tier: {0:?}")]
    ClearanceFault(String),

    /// Grant timespan outside the allowed range.
    #[error("timespan {0} out of range")]
    TimespanBreach(u64),

    /// Taxonomy out of shape.
    #[error("invalid taxonomy: {0}")]
    TaxonomyError(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl RegistryError {
    /// The taxonomy kind, or `None` for storage failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RegistryError::AccessDenied { .. } => Some(ErrorKind::AccessDenied),
            RegistryError::InvalidField { .. } => Some(ErrorKind::InvalidField),
            RegistryError::NotFound(_) => Some(ErrorKind::NotFound),
            RegistryError::Conflict(_) => Some(ErrorKind::Conflict),
            RegistryError::MetadataCorrupt { .. } => Some(ErrorKind::MetadataCorrupt),
            RegistryError::ClearanceFault(_) => Some(ErrorKind::ClearanceFault),
            RegistryError::TimespanBreach(_) => Some(ErrorKind::TimespanBreach),
            RegistryError::TaxonomyError(_) => Some(ErrorKind::TaxonomyError),
            RegistryError::Store(_) => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidField { field, reason } => {
                RegistryError::InvalidField { field, reason }
            }
            ValidationError::MetadataCorrupt { field, reason } => {
                RegistryError::MetadataCorrupt { field, reason }
            }
            ValidationError::ClearanceFault(tier) => RegistryError::ClearanceFault(tier),
            ValidationError::TimespanBreach(span) => RegistryError::TimespanBreach(span),
            ValidationError::TaxonomyError(reason) => RegistryError::TaxonomyError(reason),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(entity_ref) => RegistryError::NotFound(entity_ref),
            StoreError::Conflict(entity_ref) => RegistryError::Conflict(entity_ref),
            other => RegistryError::Store(other),
        }
    }
}

impl From<PermsError> for RegistryError {
    fn from(e: PermsError) -> Self {
        match e {
            PermsError::AccessDenied {
                entity_ref,
                actor,
                action,
            } => RegistryError::AccessDenied {
                entity_ref,
                actor,
                action,
            },
            PermsError::NotFound(entity_ref) => RegistryError::NotFound(entity_ref),
            PermsError::Validation(e) => e.into(),
            PermsError::Store(e) => e.into(),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_core::Keypair;

    #[test]
    fn test_kinds_survive_flattening() {
        let actor = Keypair::from_seed(&[9; 32]).principal();
        let denied: RegistryError = PermsError::AccessDenied {
            entity_ref: EntityRef::new(1),
            actor,
            action: Action::Write,
        }
        .into();
        assert_eq!(denied.kind(), Some(ErrorKind::AccessDenied));

        let breach: RegistryError =
            PermsError::Validation(ValidationError::TimespanBreach(0)).into();
        assert_eq!(breach.kind(), Some(ErrorKind::TimespanBreach));

        let missing: RegistryError =
            PermsError::Store(StoreError::NotFound(EntityRef::new(4))).into();
        assert!(matches!(missing, RegistryError::NotFound(r) if r == EntityRef::new(4)));

        let conflict: RegistryError = StoreError::Conflict(EntityRef::new(2)).into();
        assert_eq!(conflict.kind(), Some(ErrorKind::Conflict));
    }

    #[test]
    fn test_backend_failures_have_no_kind() {
        let err: RegistryError = StoreError::Backend("disk gone".into()).into();
        assert_eq!(err.kind(), None);
        assert!(err.to_string().contains("disk gone"));
    }
}
