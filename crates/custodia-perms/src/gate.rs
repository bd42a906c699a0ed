//! The access control gate.
//!
//! Answers "may principal P perform action A on entity E at height H".
//! Custodians may do anything. Everyone else needs an active grant whose
//! tier and edit bit cover the action.
//!
//! Every mutation path in the registry goes through [`AccessGate::ensure`]
//! rather than comparing custodians inline. The [`GatePolicy`] travels with
//! the gate and tells those paths whether a [`Decision::Delegated`] write is
//! honoured.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use custodia_core::{Action, Entity, EntityRef, Grant, Height, Principal, Tier};
use custodia_store::{Store, StoreExt};

use crate::error::{PermsError, Result};

/// Policy knobs for callers of the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePolicy {
    /// Let metadata revisions go through on a delegated `Write` decision.
    ///
    /// Off by default: only custodians revise entities, even though the
    /// gate reports `Write` for edit-bit and controller grants.
    pub delegated_writes: bool,
}

/// Outcome of a gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The actor is the entity's custodian.
    Custodian,
    /// An active grant of this tier allows the action.
    Delegated(Tier),
    /// No authority.
    Denied,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Denied)
    }
}

/// Decision logic over already-loaded records.
///
/// `grant` must be the actor's grant on `entity`, if any; activity at `now`
/// is checked here.
pub fn decide(
    entity: &Entity,
    grant: Option<&Grant>,
    actor: &Principal,
    action: Action,
    now: Height,
) -> Decision {
    if entity.is_custodian(actor) {
        return Decision::Custodian;
    }

    let Some(grant) = grant.filter(|g| {
        g.entity_ref == entity.entity_ref && &g.accessor == actor && g.is_active_at(now)
    }) else {
        return Decision::Denied;
    };

    if grant.covers(action) {
        Decision::Delegated(grant.tier)
    } else {
        Decision::Denied
    }
}

/// The gate, bound to a store for custodian and grant lookups.
pub struct AccessGate<S: Store> {
    store: Arc<S>,
    policy: GatePolicy,
}

impl<S: Store> Clone for AccessGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: Store> AccessGate<S> {
    pub fn new(store: Arc<S>, policy: GatePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Decide for an entity the caller has already loaded.
    ///
    /// Looks up the actor's grant only when the actor is not the custodian.
    pub async fn decide_for(
        &self,
        entity: &Entity,
        actor: &Principal,
        action: Action,
        now: Height,
    ) -> Result<Decision> {
        if entity.is_custodian(actor) {
            return Ok(Decision::Custodian);
        }
        let grant = self.store.active_grant(entity.entity_ref, actor, now).await?;
        Ok(decide(entity, grant.as_ref(), actor, action, now))
    }

    /// Like [`decide_for`](Self::decide_for), but a denial is an
    /// `AccessDenied` error.
    pub async fn ensure(
        &self,
        entity: &Entity,
        actor: &Principal,
        action: Action,
        now: Height,
    ) -> Result<Decision> {
        let decision = self.decide_for(entity, actor, action, now).await?;
        if !decision.is_allowed() {
            tracing::debug!(
                entity_ref = %entity.entity_ref,
                %actor,
                %action,
                "gate denied"
            );
            return Err(PermsError::AccessDenied {
                entity_ref: entity.entity_ref,
                actor: *actor,
                action,
            });
        }
        Ok(decision)
    }

    /// Whether `actor` may perform `action` on `entity_ref` at `now`.
    ///
    /// # Errors
    /// - `NotFound` if the entity does not exist.
    pub async fn authorize(
        &self,
        entity_ref: EntityRef,
        actor: &Principal,
        action: Action,
        now: Height,
    ) -> Result<bool> {
        let entity = self.store.require_entity(entity_ref).await?;
        Ok(self.decide_for(&entity, actor, action, now).await?.is_allowed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_core::{Inscription, Keypair};
    use custodia_store::MemoryStore;

    struct Setup {
        gate: AccessGate<MemoryStore>,
        store: Arc<MemoryStore>,
        entity: Entity,
        custodian: Principal,
        other: Principal,
    }

    async fn setup(policy: GatePolicy) -> Setup {
        let store = Arc::new(MemoryStore::new());
        let custodian = Keypair::from_seed(&[1; 32]).principal();
        let other = Keypair::from_seed(&[2; 32]).principal();
        let entity = store
            .create_entity(
                &custodian,
                &Inscription::new("Artifact", "f".repeat(64), "desc", "art", ["a"]),
                Height::new(1),
            )
            .await
            .unwrap();
        Setup {
            gate: AccessGate::new(Arc::clone(&store), policy),
            store,
            entity,
            custodian,
            other,
        }
    }

    fn grant(s: &Setup, tier: Tier, edit: bool) -> Grant {
        Grant::issue(
            s.entity.entity_ref,
            s.custodian,
            s.other,
            tier,
            100,
            edit,
            Height::new(10),
        )
    }

    fn artifact(custodian: Principal) -> Entity {
        Entity::inscribe(
            EntityRef::new(1),
            custodian,
            Inscription::new("Artifact", "f".repeat(64), "desc", "art", ["a"]),
            Height::new(1),
        )
    }

    #[test]
    fn test_decide_custodian_allows_everything() {
        let custodian = Keypair::from_seed(&[1; 32]).principal();
        let entity = artifact(custodian);
        for action in [Action::Read, Action::Write, Action::Grant] {
            assert_eq!(
                decide(&entity, None, &custodian, action, Height::new(1)),
                Decision::Custodian
            );
        }
    }

    #[test]
    fn test_decide_ignores_foreign_grant() {
        let custodian = Keypair::from_seed(&[1; 32]).principal();
        let other = Keypair::from_seed(&[2; 32]).principal();
        let third = Keypair::from_seed(&[3; 32]).principal();
        let entity = artifact(custodian);
        let for_third = Grant::issue(
            entity.entity_ref,
            custodian,
            third,
            Tier::Controller,
            10,
            true,
            Height::new(1),
        );

        assert_eq!(
            decide(&entity, Some(&for_third), &other, Action::Read, Height::new(2)),
            Decision::Denied
        );
    }

    #[tokio::test]
    async fn test_stranger_denied() {
        let s = setup(GatePolicy::default()).await;
        for action in [Action::Read, Action::Write, Action::Grant] {
            assert!(!s
                .gate
                .authorize(s.entity.entity_ref, &s.other, action, Height::new(5))
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn test_observer_reads_while_active() {
        let s = setup(GatePolicy::default()).await;
        s.store.put_grant(&grant(&s, Tier::Observer, false)).await.unwrap();

        let r = s.entity.entity_ref;
        let at = |h| Height::new(h);
        assert!(s.gate.authorize(r, &s.other, Action::Read, at(10)).await.unwrap());
        assert!(s.gate.authorize(r, &s.other, Action::Read, at(109)).await.unwrap());
        assert!(!s.gate.authorize(r, &s.other, Action::Read, at(110)).await.unwrap());
        assert!(!s.gate.authorize(r, &s.other, Action::Write, at(50)).await.unwrap());
        assert!(!s.gate.authorize(r, &s.other, Action::Grant, at(50)).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_follows_edit_bit_and_tier_under_default_policy() {
        let s = setup(GatePolicy::default()).await;
        let r = s.entity.entity_ref;
        let now = Height::new(20);

        s.store.put_grant(&grant(&s, Tier::Editor, false)).await.unwrap();
        assert!(!s.gate.authorize(r, &s.other, Action::Write, now).await.unwrap());

        s.store.put_grant(&grant(&s, Tier::Editor, true)).await.unwrap();
        assert_eq!(
            s.gate.decide_for(&s.entity, &s.other, Action::Write, now).await.unwrap(),
            Decision::Delegated(Tier::Editor)
        );

        s.store.put_grant(&grant(&s, Tier::Controller, false)).await.unwrap();
        assert!(s.gate.authorize(r, &s.other, Action::Write, now).await.unwrap());
        assert!(!s.gate.authorize(r, &s.other, Action::Grant, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_policy_does_not_change_decisions() {
        for policy in [GatePolicy::default(), GatePolicy { delegated_writes: true }] {
            let s = setup(policy).await;
            s.store.put_grant(&grant(&s, Tier::Observer, true)).await.unwrap();
            let decision = s
                .gate
                .decide_for(&s.entity, &s.other, Action::Write, Height::new(20))
                .await
                .unwrap();
            assert_eq!(decision, Decision::Delegated(Tier::Observer));
            assert_eq!(s.gate.policy(), &policy);
        }
    }

    #[tokio::test]
    async fn test_ensure_reports_access_denied() {
        let s = setup(GatePolicy::default()).await;
        let err = s
            .gate
            .ensure(&s.entity, &s.other, Action::Write, Height::new(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(custodia_core::ErrorKind::AccessDenied));
    }

    #[tokio::test]
    async fn test_authorize_missing_entity() {
        let s = setup(GatePolicy::default()).await;
        let err = s
            .gate
            .authorize(EntityRef::new(42), &s.custodian, Action::Read, Height::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PermsError::NotFound(r) if r == EntityRef::new(42)));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: GatePolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, GatePolicy::default());

        let policy: GatePolicy = serde_json::from_str(r#"{"delegated_writes":true}"#).unwrap();
        assert!(policy.delegated_writes);
    }
}
