//! Grant records, access tiers, and gated actions.
//!
//! A grant delegates tiered access on one entity to one accessor for a
//! bounded span of heights. Expiry is a pure function of the stored
//! termination height and the current height; nothing is ever deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Principal;
use crate::error::ValidationError;
use crate::types::{EntityRef, Height};

/// Coarse access level carried by a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Tier {
    /// Read access.
    Observer = 1,
    /// Write access.
    Editor = 2,
    /// Administrative access.
    Controller = 3,
}

impl Tier {
    /// Canonical name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Tier::Observer => "observer",
            Tier::Editor => "editor",
            Tier::Controller => "controller",
        }
    }

    /// Parse a tier name.
    ///
    /// Accepts the canonical names and the access-level words
    /// `read`, `write` and `admin`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "observer" | "read" => Some(Tier::Observer),
            "editor" | "write" => Some(Tier::Editor),
            "controller" | "admin" => Some(Tier::Controller),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Tier::Observer),
            2 => Some(Tier::Editor),
            3 => Some(Tier::Controller),
            _ => None,
        }
    }
}

impl FromStr for Tier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::parse(s).ok_or_else(|| ValidationError::ClearanceFault(s.to_string()))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a principal may attempt on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read the entity's metadata.
    Read,
    /// Replace the entity's mutable metadata.
    Write,
    /// Issue or overwrite grants on the entity.
    Grant,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Grant => "grant",
        })
    }
}

/// A stored grant, keyed by `(entity_ref, accessor)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The entity the grant applies to.
    pub entity_ref: EntityRef,

    /// Who receives access.
    pub accessor: Principal,

    /// Who issued the grant (the entity's custodian at issue time).
    pub grantor: Principal,

    /// Access level.
    pub tier: Tier,

    /// Height at which the grant was issued.
    pub authorization_height: Height,

    /// First height at which the grant is no longer active.
    pub termination_height: Height,

    /// Whether the accessor may replace metadata, independent of tier.
    pub edit_permissions: bool,
}

impl Grant {
    /// Issue a grant at `now` lasting `timespan` heights.
    pub fn issue(
        entity_ref: EntityRef,
        grantor: Principal,
        accessor: Principal,
        tier: Tier,
        timespan: u64,
        edit_permissions: bool,
        now: Height,
    ) -> Self {
        Self {
            entity_ref,
            accessor,
            grantor,
            tier,
            authorization_height: now,
            termination_height: now.after(timespan),
            edit_permissions,
        }
    }

    /// Whether the grant is active at `now`.
    ///
    /// Active over the half-open range
    /// `[authorization_height, termination_height)`.
    pub fn is_active_at(&self, now: Height) -> bool {
        self.authorization_height <= now && now < self.termination_height
    }

    /// Number of heights the grant was issued for.
    ///
    /// Zero for a record whose termination precedes its authorization.
    pub fn timespan(&self) -> u64 {
        self.termination_height
            .get()
            .saturating_sub(self.authorization_height.get())
    }

    /// Whether the grant's tier and edit bit cover `action`.
    ///
    /// Grant issuance is never delegated.
    pub fn covers(&self, action: Action) -> bool {
        match action {
            Action::Read => true,
            Action::Write => self.edit_permissions || self.tier == Tier::Controller,
            Action::Grant => false,
        }
    }
}
