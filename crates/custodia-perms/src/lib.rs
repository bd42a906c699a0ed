//! # Custodia Permissions
//!
//! Time-bounded, tiered delegation and the access control gate.
//!
//! ## Overview
//!
//! Every entity has exactly one custodian. The custodian may grant other
//! principals temporary access at one of three tiers. A grant is stored per
//! (entity, accessor) pair and overwritten by the next grant to that pair;
//! it is never deleted, only outlived.
//!
//! ## Key Concepts
//!
//! - **PrivilegeMatrix**: issues grants and answers "is this grant active"
//! - **AccessGate**: decides whether a principal may `Read`, `Write` or
//!   `Grant` on an entity at a given height
//! - **GatePolicy**: whether callers act on delegated metadata writes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use custodia_perms::{AccessGate, GatePolicy, PrivilegeMatrix};
//! use custodia_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let gate = AccessGate::new(Arc::clone(&store), GatePolicy::default());
//! let matrix = PrivilegeMatrix::new(store, gate);
//! // matrix.grant(entity_ref, &custodian, &accessor, "observer", 100, false, now).await?;
//! ```

pub mod error;
pub mod gate;
pub mod matrix;

pub use error::{PermsError, Result};
pub use gate::{decide, AccessGate, Decision, GatePolicy};
pub use matrix::PrivilegeMatrix;
