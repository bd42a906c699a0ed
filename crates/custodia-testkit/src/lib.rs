//! # Custodia Testkit
//!
//! Testing utilities for the Custodia registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Generators**: Proptest strategies for well-formed registry inputs
//! - **Fixtures**: Principals, valid records and a memory-backed registry
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use custodia_testkit::generators::InscriptionParams;
//!
//! proptest! {
//!     #[test]
//!     fn inscriptions_validate(params: InscriptionParams) {
//!         prop_assert!(custodia_core::validate_inscription(&params.inscription()).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use custodia_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let inscription = fixture.inscription("Quarterly report");
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{memory_registry, multi_party_fixtures, TestFixture, TestRegistry};
pub use generators::InscriptionParams;
