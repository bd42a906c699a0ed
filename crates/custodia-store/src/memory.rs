//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite but keeps everything in memory with no
//! persistence. Thread-safe via RwLock.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use custodia_core::{Entity, EntityRef, Grant, Height, Inscription, Principal};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Last allocated entity ref.
    sequence: u64,

    /// Entities indexed by ref.
    entities: BTreeMap<EntityRef, Entity>,

    /// Grants indexed by (entity_ref, accessor).
    grants: BTreeMap<(EntityRef, Principal), Grant>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_entity(
        &self,
        custodian: &Principal,
        inscription: &Inscription,
        now: Height,
    ) -> Result<Entity> {
        let mut inner = self.write()?;

        let entity_ref = EntityRef::new(inner.sequence + 1);
        if inner.entities.contains_key(&entity_ref) {
            return Err(StoreError::Conflict(entity_ref));
        }

        let entity = Entity::inscribe(entity_ref, *custodian, inscription.clone(), now);
        inner.entities.insert(entity_ref, entity.clone());
        inner.sequence = entity_ref.get();

        Ok(entity)
    }

    async fn get_entity(&self, entity_ref: EntityRef) -> Result<Option<Entity>> {
        let inner = self.read()?;
        Ok(inner.entities.get(&entity_ref).cloned())
    }

    async fn put_entity(&self, entity: &Entity) -> Result<()> {
        let mut inner = self.write()?;
        match inner.entities.get_mut(&entity.entity_ref) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(entity.entity_ref)),
        }
    }

    async fn list_entities(&self, custodian: Option<&Principal>) -> Result<Vec<EntityRef>> {
        let inner = self.read()?;
        Ok(inner
            .entities
            .values()
            .filter(|e| custodian.map_or(true, |c| &e.custodian == c))
            .map(|e| e.entity_ref)
            .collect())
    }

    async fn sequence(&self) -> Result<u64> {
        Ok(self.read()?.sequence)
    }

    async fn put_grant(&self, grant: &Grant) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .grants
            .insert((grant.entity_ref, grant.accessor), grant.clone());
        Ok(())
    }

    async fn get_grant(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
    ) -> Result<Option<Grant>> {
        let inner = self.read()?;
        Ok(inner.grants.get(&(entity_ref, *accessor)).cloned())
    }

    async fn grants_for_entity(&self, entity_ref: EntityRef) -> Result<Vec<Grant>> {
        let inner = self.read()?;
        Ok(inner
            .grants
            .values()
            .filter(|g| g.entity_ref == entity_ref)
            .cloned()
            .collect())
    }

    async fn grants_for_accessor(&self, accessor: &Principal) -> Result<Vec<Grant>> {
        let inner = self.read()?;
        Ok(inner
            .grants
            .values()
            .filter(|g| &g.accessor == accessor)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use custodia_core::{Keypair, Revision, Tier};

    fn inscription(name: &str) -> Inscription {
        Inscription::new(name, "f".repeat(64), "desc", "art", ["a"])
    }

    #[tokio::test]
    async fn test_create_allocates_from_one() {
        let store = MemoryStore::new();
        let custodian = Keypair::generate().principal();

        assert_eq!(store.sequence().await.unwrap(), 0);

        let first = store
            .create_entity(&custodian, &inscription("one"), Height::new(1))
            .await
            .unwrap();
        let second = store
            .create_entity(&custodian, &inscription("two"), Height::new(1))
            .await
            .unwrap();

        assert_eq!(first.entity_ref, EntityRef::new(1));
        assert_eq!(second.entity_ref, EntityRef::new(2));
        assert_eq!(store.sequence().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_put_entity_requires_existing() {
        let store = MemoryStore::new();
        let custodian = Keypair::generate().principal();
        let mut entity = store
            .create_entity(&custodian, &inscription("one"), Height::new(1))
            .await
            .unwrap();

        entity.apply_revision(
            Revision::new("renamed", "f".repeat(64), "desc", ["a"]),
            Height::new(2),
        );
        store.put_entity(&entity).await.unwrap();
        assert_eq!(store.require_entity(entity.entity_ref).await.unwrap(), entity);

        entity.entity_ref = EntityRef::new(99);
        assert!(matches!(
            store.put_entity(&entity).await,
            Err(StoreError::NotFound(r)) if r == EntityRef::new(99)
        ));
    }

    #[tokio::test]
    async fn test_grant_overwrite_and_active_lookup() {
        let store = MemoryStore::new();
        let custodian = Keypair::generate().principal();
        let accessor = Keypair::generate().principal();
        let entity = store
            .create_entity(&custodian, &inscription("one"), Height::new(1))
            .await
            .unwrap();

        let first = Grant::issue(
            entity.entity_ref,
            custodian,
            accessor,
            Tier::Observer,
            10,
            false,
            Height::new(1),
        );
        let second = Grant::issue(
            entity.entity_ref,
            custodian,
            accessor,
            Tier::Controller,
            5,
            true,
            Height::new(2),
        );
        store.put_grant(&first).await.unwrap();
        store.put_grant(&second).await.unwrap();

        let grants = store.grants_for_entity(entity.entity_ref).await.unwrap();
        assert_eq!(grants, vec![second.clone()]);

        let active = store
            .active_grant(entity.entity_ref, &accessor, Height::new(6))
            .await
            .unwrap();
        assert_eq!(active, Some(second));

        let expired = store
            .active_grant(entity.entity_ref, &accessor, Height::new(7))
            .await
            .unwrap();
        assert_eq!(expired, None);
    }

    #[tokio::test]
    async fn test_list_entities_by_custodian() {
        let store = MemoryStore::new();
        let alice = Keypair::generate().principal();
        let bob = Keypair::generate().principal();

        store.create_entity(&alice, &inscription("a1"), Height::new(1)).await.unwrap();
        store.create_entity(&bob, &inscription("b1"), Height::new(1)).await.unwrap();
        store.create_entity(&alice, &inscription("a2"), Height::new(1)).await.unwrap();

        assert_eq!(
            store.list_entities(Some(&alice)).await.unwrap(),
            vec![EntityRef::new(1), EntityRef::new(3)]
        );
        assert_eq!(store.list_entities(None).await.unwrap().len(), 3);
        assert!(store.grants_for_accessor(&bob).await.unwrap().is_empty());
    }
}
