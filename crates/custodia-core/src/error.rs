//! Error types for Custodia Core.

use std::fmt;

use thiserror::Error;

/// The registry's error taxonomy.
///
/// Every failure a caller can observe maps to exactly one kind. Crate-level
/// error enums expose their kind through a `kind()` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the authority the operation requires.
    AccessDenied,
    /// Malformed designation, fingerprint, or accessor.
    InvalidField,
    /// Referenced entity has no record.
    NotFound,
    /// Duplicate key observed by a backend.
    Conflict,
    /// Abstract or tag list fails shape validation.
    MetadataCorrupt,
    /// Tier not in the recognized set.
    ClearanceFault,
    /// Timespan outside the accepted range.
    TimespanBreach,
    /// Taxonomy fails shape validation.
    TaxonomyError,
}

impl ErrorKind {
    /// Stable lowercase name, used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::InvalidField => "invalid_field",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::MetadataCorrupt => "metadata_corrupt",
            ErrorKind::ClearanceFault => "clearance_fault",
            ErrorKind::TimespanBreach => "timespan_breach",
            ErrorKind::TaxonomyError => "taxonomy_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("corrupt metadata in {field}: {reason}")]
    MetadataCorrupt { field: &'static str, reason: String },

    #[error("unrecognized tier: {0:?}")]
    ClearanceFault(String),

    #[error("timespan {0} outside accepted range")]
    TimespanBreach(u64),

    #[error("invalid taxonomy: {0}")]
    TaxonomyError(String),
}

impl ValidationError {
    /// The taxonomy kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidField { .. } => ErrorKind::InvalidField,
            ValidationError::MetadataCorrupt { .. } => ErrorKind::MetadataCorrupt,
            ValidationError::ClearanceFault(_) => ErrorKind::ClearanceFault,
            ValidationError::TimespanBreach(_) => ErrorKind::TimespanBreach,
            ValidationError::TaxonomyError(_) => ErrorKind::TaxonomyError,
        }
    }
}
