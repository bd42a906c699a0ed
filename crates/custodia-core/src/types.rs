//! Strong type definitions for Custodia.
//!
//! Identifiers and clock values are newtypes so an entity ref can never be
//! passed where a height is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity.
///
/// Assigned from the registry's sequence counter, starting at 1. A ref is
/// never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub u64);

impl EntityRef {
    /// Create from the raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw counter value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({})", self.0)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityRef {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A logical height supplied by the external clock.
///
/// Heights are monotonically non-decreasing across operations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Height(pub u64);

impl Height {
    /// The zero height.
    pub const ZERO: Self = Self(0);

    /// Create from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The height `span` units after this one, saturating at `u64::MAX`.
    pub const fn after(&self, span: u64) -> Self {
        Self(self.0.saturating_add(span))
    }
}

impl fmt::Debug for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height({})", self.0)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Height {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
