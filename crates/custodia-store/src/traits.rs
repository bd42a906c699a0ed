//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (persistent) and in-memory.

use async_trait::async_trait;
use custodia_core::{Entity, EntityRef, Grant, Height, Inscription, Principal};

use crate::error::{Result, StoreError};

/// The Store trait: async interface for entity and grant persistence.
///
/// Backends do no validation and no authorization; the registry does both
/// before calling in. Every method is individually atomic.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Entity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate the next entity ref and insert a new record under it.
    ///
    /// The record gets `custodian`, and `now` as both genesis and revision
    /// height. The sequence counter advances only if the insert succeeds.
    ///
    /// # Errors
    /// - `Conflict` if a record already exists at the allocated ref.
    async fn create_entity(
        &self,
        custodian: &Principal,
        inscription: &Inscription,
        now: Height,
    ) -> Result<Entity>;

    /// Get an entity by ref.
    async fn get_entity(&self, entity_ref: EntityRef) -> Result<Option<Entity>>;

    /// Replace an existing entity record.
    ///
    /// # Errors
    /// - `NotFound` if no record exists at `entity.entity_ref`.
    async fn put_entity(&self, entity: &Entity) -> Result<()>;

    /// List entity refs in ascending order, optionally filtered by custodian.
    async fn list_entities(&self, custodian: Option<&Principal>) -> Result<Vec<EntityRef>>;

    /// The last allocated entity ref value (0 when empty).
    async fn sequence(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or overwrite the grant for `(grant.entity_ref, grant.accessor)`.
    async fn put_grant(&self, grant: &Grant) -> Result<()>;

    /// Get the stored grant for a pair, expired or not.
    async fn get_grant(&self, entity_ref: EntityRef, accessor: &Principal)
        -> Result<Option<Grant>>;

    /// All grants on an entity, ordered by accessor.
    async fn grants_for_entity(&self, entity_ref: EntityRef) -> Result<Vec<Grant>>;

    /// All grants held by an accessor, ordered by entity ref.
    async fn grants_for_accessor(&self, accessor: &Principal) -> Result<Vec<Grant>>;
}

/// Extension trait for common store lookups.
pub trait StoreExt: Store {
    /// Get an entity, failing with `NotFound` if it is absent.
    fn require_entity(
        &self,
        entity_ref: EntityRef,
    ) -> impl std::future::Future<Output = Result<Entity>> + Send;

    /// Get the grant for a pair only if it is active at `now`.
    fn active_grant(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
        now: Height,
    ) -> impl std::future::Future<Output = Result<Option<Grant>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn require_entity(&self, entity_ref: EntityRef) -> Result<Entity> {
        self.get_entity(entity_ref)
            .await?
            .ok_or(StoreError::NotFound(entity_ref))
    }

    async fn active_grant(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
        now: Height,
    ) -> Result<Option<Grant>> {
        Ok(self
            .get_grant(entity_ref, accessor)
            .await?
            .filter(|grant| grant.is_active_at(now)))
    }
}
