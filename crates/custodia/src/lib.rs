//! # Custodia
//!
//! A registry of named, versioned entities with custodian-controlled,
//! time-bounded delegated access.
//!
//! ## Overview
//!
//! - **Entities**: metadata records bound to a 64-character fingerprint,
//!   each with exactly one custodian who never changes
//! - **Grants**: tiered (observer, editor, controller) access for another
//!   principal, expiring at a fixed height
//! - **Gate**: a single authorization point every mutation passes through
//!
//! Heights come from a [`Clock`](custodia_core::Clock) owned by the
//! registry; callers are identified by an explicit
//! [`Principal`](custodia_core::Principal).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custodia::{Registry, RegistryConfig};
//! use custodia::core::{Keypair, ManualClock, Height};
//! use custodia::store::SqliteStore;
//!
//! async fn example() {
//!     let alice = Keypair::generate().principal();
//!     let bob = Keypair::generate().principal();
//!
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let clock = ManualClock::new(Height::ZERO);
//!     let registry = Registry::new(store, clock, RegistryConfig::default());
//!
//!     let entity_ref = registry
//!         .inscribe(&alice, "Quarterly report", &"0".repeat(64), "Q3 figures", "finance", &["q3"])
//!         .await
//!         .unwrap();
//!
//!     registry
//!         .grant_privilege(&alice, entity_ref, &bob, "observer", 100, false)
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `custodia::core` - Records, principals, validation, clocks
//! - `custodia::store` - Storage abstraction, SQLite and in-memory backends
//! - `custodia::perms` - Privilege matrix and access gate

pub mod config;
pub mod entities;
pub mod error;
pub mod registry;

// Re-export component crates
pub use custodia_core as core;
pub use custodia_perms as perms;
pub use custodia_store as store;

// Re-export main types for convenience
pub use config::RegistryConfig;
pub use entities::EntityStore;
pub use error::{RegistryError, Result};
pub use registry::Registry;

// Re-export commonly used core types
pub use custodia_core::{
    Action, Clock, Entity, EntityRef, ErrorKind, Grant, Height, Inscription, Keypair, Principal,
    Revision, Tier,
};
pub use custodia_perms::GatePolicy;
