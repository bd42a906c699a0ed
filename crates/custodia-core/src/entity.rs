//! Entity records and the field sets used to create and revise them.
//!
//! An entity is created from an [`Inscription`] and changed only through a
//! [`Revision`]. The revision carries the mutable subset of fields; the
//! custodian, genesis height and taxonomy are fixed at creation.

use serde::{Deserialize, Serialize};

use crate::crypto::Principal;
use crate::types::{EntityRef, Height};

/// A registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier assigned at creation.
    pub entity_ref: EntityRef,

    /// Short name.
    pub designation: String,

    /// The owning principal. Immutable after creation.
    pub custodian: Principal,

    /// 64-character fingerprint binding the entity to off-registry content.
    pub cipher_fingerprint: String,

    /// Free-text description (the entity's abstract).
    #[serde(rename = "abstract")]
    pub summary: String,

    /// Height at creation.
    pub genesis_height: Height,

    /// Height of the most recent metadata change.
    pub revision_height: Height,

    /// Classification, fixed at creation.
    pub taxonomy: String,

    /// Ordered tags.
    pub tags: Vec<String>,
}

impl Entity {
    /// Build a fresh record from an inscription.
    pub fn inscribe(
        entity_ref: EntityRef,
        custodian: Principal,
        inscription: Inscription,
        now: Height,
    ) -> Self {
        Self {
            entity_ref,
            designation: inscription.designation,
            custodian,
            cipher_fingerprint: inscription.cipher_fingerprint,
            summary: inscription.summary,
            genesis_height: now,
            revision_height: now,
            taxonomy: inscription.taxonomy,
            tags: inscription.tags,
        }
    }

    /// Replace every mutable field and stamp the revision height.
    ///
    /// The revision height never moves backwards, even if the clock does.
    pub fn apply_revision(&mut self, revision: Revision, now: Height) {
        self.designation = revision.designation;
        self.cipher_fingerprint = revision.cipher_fingerprint;
        self.summary = revision.summary;
        self.tags = revision.tags;
        self.revision_height = self.revision_height.max(now);
    }

    /// Whether `principal` is this entity's custodian.
    pub fn is_custodian(&self, principal: &Principal) -> bool {
        &self.custodian == principal
    }

    /// The current mutable fields, suitable for resubmitting as a revision.
    pub fn current_revision(&self) -> Revision {
        Revision {
            designation: self.designation.clone(),
            cipher_fingerprint: self.cipher_fingerprint.clone(),
            summary: self.summary.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Fields supplied when creating an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inscription {
    pub designation: String,
    pub cipher_fingerprint: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub taxonomy: String,
    pub tags: Vec<String>,
}

impl Inscription {
    pub fn new(
        designation: impl Into<String>,
        cipher_fingerprint: impl Into<String>,
        summary: impl Into<String>,
        taxonomy: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            designation: designation.into(),
            cipher_fingerprint: cipher_fingerprint.into(),
            summary: summary.into(),
            taxonomy: taxonomy.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// The mutable subset of an entity's fields.
///
/// A revision replaces every field wholesale; callers resupply unchanged
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub designation: String,
    pub cipher_fingerprint: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub tags: Vec<String>,
}

impl Revision {
    pub fn new(
        designation: impl Into<String>,
        cipher_fingerprint: impl Into<String>,
        summary: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            designation: designation.into(),
            cipher_fingerprint: cipher_fingerprint.into(),
            summary: summary.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn sample(now: u64) -> Entity {
        let custodian = Keypair::from_seed(&[1; 32]).principal();
        let inscription = Inscription::new("Artifact", "f".repeat(64), "desc", "art", ["a"]);
        Entity::inscribe(EntityRef::new(1), custodian, inscription, Height::new(now))
    }

    #[test]
    fn test_inscribe_sets_both_heights() {
        let entity = sample(5);
        assert_eq!(entity.genesis_height, Height::new(5));
        assert_eq!(entity.revision_height, Height::new(5));
    }

    #[test]
    fn test_revision_keeps_immutable_fields() {
        let mut entity = sample(5);
        let custodian = entity.custodian;

        entity.apply_revision(
            Revision::new("Artifact2", "e".repeat(64), "desc2", ["a", "b"]),
            Height::new(9),
        );

        assert_eq!(entity.designation, "Artifact2");
        assert_eq!(entity.tags, vec!["a", "b"]);
        assert_eq!(entity.custodian, custodian);
        assert_eq!(entity.taxonomy, "art");
        assert_eq!(entity.genesis_height, Height::new(5));
        assert_eq!(entity.revision_height, Height::new(9));
    }

    #[test]
    fn test_revision_height_never_regresses() {
        let mut entity = sample(5);
        let current = entity.current_revision();
        entity.apply_revision(current, Height::new(3));
        assert_eq!(entity.revision_height, Height::new(5));
    }

    #[test]
    fn test_abstract_serializes_under_its_name() {
        let json = serde_json::to_value(sample(1)).unwrap();
        assert_eq!(json["abstract"], "desc");
    }
}
