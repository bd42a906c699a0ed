//! # Custodia Store
//!
//! Storage abstraction for the Custodia registry. Provides a trait-based
//! interface for entity, grant and sequence persistence with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Lookups built on top of [`Store`]
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custodia_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("registry.db").unwrap();
//!
//!     // Or keep everything in memory
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let next = store.sequence().await.unwrap() + 1;
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic allocation**: `create_entity` reads the sequence, inserts the
//!   record and commits the new sequence in one step
//! - **Overwriting grants**: `put_grant` replaces any grant for the same
//!   `(entity_ref, accessor)` pair
//! - **No deletion**: nothing in the store is ever removed

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
