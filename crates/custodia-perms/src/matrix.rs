//! The privilege matrix: (entity, accessor) -> grant.
//!
//! At most one grant exists per pair and a later grant overwrites the earlier
//! one unconditionally. Grants are never deleted; expiry is computed from the
//! current height.

use std::sync::Arc;

use custodia_core::{
    validate_accessor, validate_grant_terms, Action, EntityRef, Grant, Height, Principal,
};
use custodia_store::{Store, StoreExt};

use crate::error::Result;
use crate::gate::AccessGate;

/// Grant issuance and lookup over a store.
pub struct PrivilegeMatrix<S: Store> {
    store: Arc<S>,
    gate: AccessGate<S>,
}

impl<S: Store> PrivilegeMatrix<S> {
    pub fn new(store: Arc<S>, gate: AccessGate<S>) -> Self {
        Self { store, gate }
    }

    pub fn gate(&self) -> &AccessGate<S> {
        &self.gate
    }

    /// Issue (or replace) the grant for `accessor` on `entity_ref`.
    ///
    /// A self-grant is refused before any lookup. Then the entity must exist
    /// and the gate must allow `caller` to [`Action::Grant`], and only then
    /// are tier and timespan checked.
    ///
    /// # Errors
    /// - `InvalidField` if `accessor == caller`
    /// - `NotFound` if the entity does not exist
    /// - `AccessDenied` if the caller may not issue grants
    /// - `ClearanceFault` for an unknown tier
    /// - `TimespanBreach` outside `[1, 52560]`
    #[allow(clippy::too_many_arguments)]
    pub async fn grant(
        &self,
        entity_ref: EntityRef,
        caller: &Principal,
        accessor: &Principal,
        tier: &str,
        timespan: u64,
        edit_permissions: bool,
        now: Height,
    ) -> Result<Grant> {
        validate_accessor(caller, accessor)?;

        let entity = self.store.require_entity(entity_ref).await?;
        self.gate.ensure(&entity, caller, Action::Grant, now).await?;
        let tier = validate_grant_terms(tier, timespan)?;

        let grant = Grant::issue(
            entity_ref,
            *caller,
            *accessor,
            tier,
            timespan,
            edit_permissions,
            now,
        );
        self.store.put_grant(&grant).await?;

        tracing::debug!(
            %entity_ref,
            %accessor,
            %tier,
            termination = grant.termination_height.get(),
            "grant stored"
        );

        Ok(grant)
    }

    /// The grant for the pair if it is active at `now`.
    pub async fn is_active(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
        now: Height,
    ) -> Result<Option<Grant>> {
        Ok(self.store.active_grant(entity_ref, accessor, now).await?)
    }

    /// Every grant ever issued on an entity, expired ones included.
    pub async fn grants_for(&self, entity_ref: EntityRef) -> Result<Vec<Grant>> {
        Ok(self.store.grants_for_entity(entity_ref).await?)
    }

    /// Grants on an entity that are active at `now`.
    pub async fn active_grants_for(
        &self,
        entity_ref: EntityRef,
        now: Height,
    ) -> Result<Vec<Grant>> {
        let mut grants = self.grants_for(entity_ref).await?;
        grants.retain(|g| g.is_active_at(now));
        Ok(grants)
    }

    pub async fn grants_held_by(&self, accessor: &Principal) -> Result<Vec<Grant>> {
        Ok(self.store.grants_for_accessor(accessor).await?)
    }
}
