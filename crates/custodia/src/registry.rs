//! The Registry: the public face of Custodia.
//!
//! Brings together the entity store, the privilege matrix and the access
//! gate behind three mutating operations (`inscribe`, `revise`,
//! `grant_privilege`) and a set of reads.

use std::sync::Arc;

use tokio::sync::Mutex;

use custodia_core::{
    Action, Clock, Entity, EntityRef, Grant, Height, Inscription, Principal, Revision,
};
use custodia_perms::{AccessGate, PrivilegeMatrix};
use custodia_store::{Store, StoreExt};

use crate::config::RegistryConfig;
use crate::entities::EntityStore;
use crate::error::Result;

/// The main Registry struct.
///
/// Every mutating operation holds the commit lock from its first read to
/// its last write, and reads the clock while holding it.
pub struct Registry<S: Store, C: Clock> {
    /// The storage backend.
    store: Arc<S>,
    /// Source of the current height.
    clock: C,
    /// Configuration.
    config: RegistryConfig,
    gate: AccessGate<S>,
    entities: EntityStore<S>,
    matrix: PrivilegeMatrix<S>,
    /// Serialises check-then-write sequences.
    commit: Mutex<()>,
}

impl<S: Store, C: Clock> Registry<S, C> {
    /// Create a new registry instance.
    pub fn new(store: S, clock: C, config: RegistryConfig) -> Self {
        Self::with_shared_store(Arc::new(store), clock, config)
    }

    /// Create a registry over a store that is also used elsewhere.
    pub fn with_shared_store(store: Arc<S>, clock: C, config: RegistryConfig) -> Self {
        let gate = AccessGate::new(Arc::clone(&store), config.gate);
        Self {
            entities: EntityStore::new(Arc::clone(&store), gate.clone()),
            matrix: PrivilegeMatrix::new(Arc::clone(&store), gate.clone()),
            gate,
            store,
            clock,
            config,
            commit: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The clock's current height.
    pub fn height(&self) -> Height {
        self.clock.current_height()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new entity with `caller` as its custodian.
    ///
    /// # Errors
    /// - `InvalidField` for a bad designation or fingerprint
    /// - `MetadataCorrupt` for a bad abstract or tag list
    /// - `TaxonomyError` for a bad taxonomy
    pub async fn inscribe(
        &self,
        caller: &Principal,
        designation: &str,
        cipher_fingerprint: &str,
        summary: &str,
        taxonomy: &str,
        tags: &[impl AsRef<str>],
    ) -> Result<EntityRef> {
        let inscription = Inscription::new(
            designation,
            cipher_fingerprint,
            summary,
            taxonomy,
            tags.iter().map(|t| AsRef::<str>::as_ref(t)),
        );
        self.inscribe_record(caller, &inscription).await
    }

    /// [`inscribe`](Self::inscribe) with the fields already assembled.
    pub async fn inscribe_record(
        &self,
        caller: &Principal,
        inscription: &Inscription,
    ) -> Result<EntityRef> {
        let _commit = self.commit.lock().await;
        let now = self.clock.current_height();

        let entity = self
            .observe("inscribe", self.entities.create(caller, inscription, now).await)?;

        tracing::info!(
            entity_ref = %entity.entity_ref,
            custodian = %caller,
            height = now.get(),
            "entity inscribed"
        );
        Ok(entity.entity_ref)
    }

    /// Replace the designation, fingerprint, abstract and tags of an entity.
    ///
    /// # Errors
    /// - `NotFound` if the entity does not exist
    /// - `AccessDenied` if the gate refuses `Write`, or the caller is not the
    ///   custodian and delegated writes are off
    /// - `InvalidField` / `MetadataCorrupt` for bad fields
    pub async fn revise(
        &self,
        caller: &Principal,
        entity_ref: EntityRef,
        designation: &str,
        cipher_fingerprint: &str,
        summary: &str,
        tags: &[impl AsRef<str>],
    ) -> Result<bool> {
        let revision = Revision::new(
            designation,
            cipher_fingerprint,
            summary,
            tags.iter().map(|t| AsRef::<str>::as_ref(t)),
        );
        self.revise_record(caller, entity_ref, revision).await
    }

    /// [`revise`](Self::revise) with the fields already assembled.
    pub async fn revise_record(
        &self,
        caller: &Principal,
        entity_ref: EntityRef,
        revision: Revision,
    ) -> Result<bool> {
        let _commit = self.commit.lock().await;
        let now = self.clock.current_height();

        let entity = self.observe(
            "revise",
            self.entities.update(entity_ref, caller, revision, now).await,
        )?;

        tracing::info!(
            %entity_ref,
            actor = %caller,
            height = entity.revision_height.get(),
            "entity revised"
        );
        Ok(true)
    }

    /// Get an entity without an access check.
    pub async fn entity(&self, entity_ref: EntityRef) -> Result<Option<Entity>> {
        self.entities.get(entity_ref).await
    }

    /// Get an entity on behalf of `actor`, who must be allowed to `Read` it.
    pub async fn read_entity(&self, actor: &Principal, entity_ref: EntityRef) -> Result<Entity> {
        let now = self.clock.current_height();
        let result = self.gated_read(actor, entity_ref, now).await;
        self.observe("read", result)
    }

    async fn gated_read(
        &self,
        actor: &Principal,
        entity_ref: EntityRef,
        now: Height,
    ) -> Result<Entity> {
        let entity = self.store.require_entity(entity_ref).await?;
        self.gate.ensure(&entity, actor, Action::Read, now).await?;
        Ok(entity)
    }

    /// Refs of every entity in custody of `custodian`.
    pub async fn entities_of(&self, custodian: &Principal) -> Result<Vec<EntityRef>> {
        Ok(self.store.list_entities(Some(custodian)).await?)
    }

    /// The last allocated entity ref, 0 before the first inscription.
    pub async fn sequence(&self) -> Result<u64> {
        Ok(self.store.sequence().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Privilege Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `accessor` time-bounded access to an entity.
    ///
    /// `tier` is one of `observer`, `editor`, `controller` (or the aliases
    /// `read`, `write`, `admin`). Replaces any existing grant for the pair.
    ///
    /// # Errors
    /// - `InvalidField` if `accessor == caller`
    /// - `NotFound` if the entity does not exist
    /// - `AccessDenied` unless `caller` is the custodian
    /// - `ClearanceFault` for an unknown tier
    /// - `TimespanBreach` outside `[1, 52560]`
    pub async fn grant_privilege(
        &self,
        caller: &Principal,
        entity_ref: EntityRef,
        accessor: &Principal,
        tier: &str,
        timespan: u64,
        edit_permissions: bool,
    ) -> Result<bool> {
        let _commit = self.commit.lock().await;
        let now = self.clock.current_height();

        let result = self
            .matrix
            .grant(entity_ref, caller, accessor, tier, timespan, edit_permissions, now)
            .await
            .map_err(Into::into);
        let grant = self.observe("grant_privilege", result)?;

        tracing::info!(
            %entity_ref,
            %accessor,
            tier = %grant.tier,
            until = grant.termination_height.get(),
            "privilege granted"
        );
        Ok(true)
    }

    /// The grant for the pair, if it is active at the current height.
    pub async fn active_grant(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
    ) -> Result<Option<Grant>> {
        let now = self.clock.current_height();
        Ok(self.matrix.is_active(entity_ref, accessor, now).await?)
    }

    /// Every grant on an entity, expired ones included.
    pub async fn grants_for(&self, entity_ref: EntityRef) -> Result<Vec<Grant>> {
        Ok(self.matrix.grants_for(entity_ref).await?)
    }

    pub async fn active_grants_for(&self, entity_ref: EntityRef) -> Result<Vec<Grant>> {
        let now = self.clock.current_height();
        Ok(self.matrix.active_grants_for(entity_ref, now).await?)
    }

    /// Whether `actor` may perform `action` on the entity right now.
    pub async fn authorize(
        &self,
        entity_ref: EntityRef,
        actor: &Principal,
        action: Action,
    ) -> Result<bool> {
        let now = self.clock.current_height();
        Ok(self.gate.authorize(entity_ref, actor, action, now).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn observe<T>(&self, op: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if self.config.log_rejections {
                match e.kind() {
                    Some(kind) => tracing::debug!(op, %kind, error = %e, "rejected"),
                    None => tracing::error!(op, error = %e, "storage failure"),
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_core::{ErrorKind, FixedClock, Keypair, ManualClock};
    use custodia_store::MemoryStore;

    const FP: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[tokio::test]
    async fn test_inscribe_then_read() {
        let registry = Registry::new(
            MemoryStore::new(),
            FixedClock(Height::new(3)),
            RegistryConfig::default(),
        );
        let alice = Keypair::from_seed(&[1; 32]).principal();
        let bob = Keypair::from_seed(&[2; 32]).principal();

        let r = registry
            .inscribe(&alice, "Artifact", FP, "An artifact", "art", &["x"])
            .await
            .unwrap();
        assert_eq!(r, EntityRef::new(1));
        assert_eq!(registry.sequence().await.unwrap(), 1);

        let entity = registry.read_entity(&alice, r).await.unwrap();
        assert_eq!(entity.genesis_height, Height::new(3));

        let err = registry.read_entity(&bob, r).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::AccessDenied));
    }

    #[tokio::test]
    async fn test_heights_follow_the_clock() {
        let clock = Arc::new(ManualClock::new(Height::new(10)));
        let registry =
            Registry::new(MemoryStore::new(), Arc::clone(&clock), RegistryConfig::default());
        let alice = Keypair::from_seed(&[1; 32]).principal();
        let bob = Keypair::from_seed(&[2; 32]).principal();

        let r = registry
            .inscribe(&alice, "Artifact", FP, "An artifact", "art", &["x"])
            .await
            .unwrap();
        registry.grant_privilege(&alice, r, &bob, "observer", 5, false).await.unwrap();
        assert!(registry.authorize(r, &bob, Action::Read).await.unwrap());

        clock.advance(4);
        assert!(registry.active_grant(r, &bob).await.unwrap().is_some());
        clock.advance(1);
        assert!(registry.active_grant(r, &bob).await.unwrap().is_none());
        assert!(!registry.authorize(r, &bob, Action::Read).await.unwrap());

        registry
            .revise(&alice, r, "Renamed", FP, "Still an artifact", &["y"])
            .await
            .unwrap();
        let entity = registry.entity(r).await.unwrap().unwrap();
        assert_eq!(entity.genesis_height, Height::new(10));
        assert_eq!(entity.revision_height, Height::new(15));
    }
}
