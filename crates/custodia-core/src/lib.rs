//! # Custodia Core
//!
//! Pure primitives for the Custodia registry: entities, grants, principals,
//! and field validation.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over the registry's records.
//!
//! ## Key Types
//!
//! - [`Entity`] - A versioned metadata record with a single custodian
//! - [`EntityRef`] - Monotonically assigned entity identifier
//! - [`Grant`] - A time-bounded, tiered delegation of access
//! - [`Principal`] - An Ed25519 public key acting on the registry
//! - [`Height`] - The logical clock value used for all timestamps
//!
//! ## Validation
//!
//! Field-level predicates live in the [`validation`] module. They return
//! `bool`; the `validate_*` composites translate the first failure into a
//! [`ValidationError`].

pub mod clock;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod grant;
pub mod types;
pub mod validation;

pub use clock::{Clock, FixedClock, ManualClock};
pub use crypto::{Fingerprint, Keypair, Principal};
pub use entity::{Entity, Inscription, Revision};
pub use error::{ErrorKind, ValidationError};
pub use grant::{Action, Grant, Tier};
pub use types::{EntityRef, Height};
pub use validation::{
    validate_accessor, validate_grant, validate_grant_terms, validate_inscription,
    validate_revision,
};
