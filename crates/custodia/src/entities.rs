//! The entity store: create, get and update of entity records.

use std::sync::Arc;

use custodia_core::{
    validate_inscription, validate_revision, Action, Entity, EntityRef, Height, Inscription,
    Principal, Revision,
};
use custodia_perms::{AccessGate, Decision};
use custodia_store::{Store, StoreExt};

use crate::error::{RegistryError, Result};

/// Entity records over a store, with writes routed through the gate.
pub struct EntityStore<S: Store> {
    store: Arc<S>,
    gate: AccessGate<S>,
}

impl<S: Store> EntityStore<S> {
    pub fn new(store: Arc<S>, gate: AccessGate<S>) -> Self {
        Self { store, gate }
    }

    /// Validate and insert a new entity owned by `caller`.
    ///
    /// Fields are checked in order designation, fingerprint, abstract,
    /// taxonomy, tags. Nothing is written unless all pass.
    pub async fn create(
        &self,
        caller: &Principal,
        inscription: &Inscription,
        now: Height,
    ) -> Result<Entity> {
        validate_inscription(inscription)?;
        Ok(self.store.create_entity(caller, inscription, now).await?)
    }

    pub async fn get(&self, entity_ref: EntityRef) -> Result<Option<Entity>> {
        Ok(self.store.get_entity(entity_ref).await?)
    }

    /// Replace the mutable metadata of an entity.
    ///
    /// Existence is checked first, then authorization for
    /// [`Action::Write`], then the new fields. Unless the gate policy allows
    /// delegated writes, only the custodian gets past authorization.
    /// Custodian, genesis height and taxonomy are never touched.
    pub async fn update(
        &self,
        entity_ref: EntityRef,
        caller: &Principal,
        revision: Revision,
        now: Height,
    ) -> Result<Entity> {
        let mut entity = self.store.require_entity(entity_ref).await?;
        let decision = self.gate.ensure(&entity, caller, Action::Write, now).await?;
        if decision != Decision::Custodian && !self.gate.policy().delegated_writes {
            tracing::debug!(%entity_ref, actor = %caller, "delegated write refused by policy");
            return Err(RegistryError::AccessDenied {
                entity_ref,
                actor: *caller,
                action: Action::Write,
            });
        }
        validate_revision(&revision)?;

        entity.apply_revision(revision, now);
        self.store.put_entity(&entity).await?;
        Ok(entity)
    }
}
