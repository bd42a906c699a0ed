//! Field validation: stateless shape predicates and their composites.
//!
//! The predicates are total and side-effect free and return `bool`. The
//! `validate_*` functions check every field of an operation in a fixed order
//! and translate the first failure into a [`ValidationError`], so callers can
//! validate everything before performing the first write.
//!
//! Lengths count Unicode scalar values, not bytes.

use crate::crypto::Principal;
use crate::entity::{Inscription, Revision};
use crate::error::ValidationError;
use crate::grant::Tier;

/// Maximum designation length.
pub const MAX_DESIGNATION_LEN: usize = 50;

/// Exact fingerprint length.
pub const FINGERPRINT_LEN: usize = 64;

/// Maximum abstract length.
pub const MAX_ABSTRACT_LEN: usize = 200;

/// Maximum taxonomy length.
pub const MAX_TAXONOMY_LEN: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LEN: usize = 30;

/// Maximum number of tags on an entity.
pub const MAX_TAGS: usize = 5;

/// Minimum grant timespan, in heights.
pub const MIN_TIMESPAN: u64 = 1;

/// Maximum grant timespan, in heights.
pub const MAX_TIMESPAN: u64 = 52_560;

fn len_within(s: &str, max: usize) -> bool {
    let len = s.chars().count();
    (1..=max).contains(&len)
}

pub fn valid_designation(s: &str) -> bool {
    len_within(s, MAX_DESIGNATION_LEN)
}

/// A fingerprint is fixed-width, never a range.
pub fn valid_fingerprint(s: &str) -> bool {
    s.chars().count() == FINGERPRINT_LEN
}

pub fn valid_abstract(s: &str) -> bool {
    len_within(s, MAX_ABSTRACT_LEN)
}

pub fn valid_taxonomy(s: &str) -> bool {
    len_within(s, MAX_TAXONOMY_LEN)
}

pub fn valid_tag(s: &str) -> bool {
    len_within(s, MAX_TAG_LEN)
}

pub fn valid_tags<S: AsRef<str>>(tags: &[S]) -> bool {
    (1..=MAX_TAGS).contains(&tags.len()) && tags.iter().all(|t| valid_tag(t.as_ref()))
}

pub fn valid_tier(s: &str) -> bool {
    Tier::parse(s).is_some()
}

pub fn valid_timespan(n: u64) -> bool {
    (MIN_TIMESPAN..=MAX_TIMESPAN).contains(&n)
}

/// Rejects self-grants: the accessor must differ from the acting principal.
pub fn valid_accessor(principal: &Principal, actor: &Principal) -> bool {
    principal != actor
}

fn check_designation(s: &str) -> Result<(), ValidationError> {
    if valid_designation(s) {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            field: "designation",
            reason: format!("length must be 1..={MAX_DESIGNATION_LEN}"),
        })
    }
}

fn check_fingerprint(s: &str) -> Result<(), ValidationError> {
    if valid_fingerprint(s) {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            field: "cipher_fingerprint",
            reason: format!("length must be exactly {FINGERPRINT_LEN}"),
        })
    }
}

fn check_abstract(s: &str) -> Result<(), ValidationError> {
    if valid_abstract(s) {
        Ok(())
    } else {
        Err(ValidationError::MetadataCorrupt {
            field: "abstract",
            reason: format!("length must be 1..={MAX_ABSTRACT_LEN}"),
        })
    }
}

fn check_tags(tags: &[String]) -> Result<(), ValidationError> {
    if valid_tags(tags) {
        Ok(())
    } else {
        Err(ValidationError::MetadataCorrupt {
            field: "tags",
            reason: format!("need 1..={MAX_TAGS} tags of length 1..={MAX_TAG_LEN}"),
        })
    }
}

/// Validate every field of an inscription.
///
/// Order: designation, fingerprint, abstract, taxonomy, tags.
pub fn validate_inscription(inscription: &Inscription) -> Result<(), ValidationError> {
    check_designation(&inscription.designation)?;
    check_fingerprint(&inscription.cipher_fingerprint)?;
    check_abstract(&inscription.summary)?;
    if !valid_taxonomy(&inscription.taxonomy) {
        return Err(ValidationError::TaxonomyError(format!(
            "length must be 1..={MAX_TAXONOMY_LEN}"
        )));
    }
    check_tags(&inscription.tags)
}

/// Validate every field of a revision.
///
/// Order: designation, fingerprint, abstract, tags.
pub fn validate_revision(revision: &Revision) -> Result<(), ValidationError> {
    check_designation(&revision.designation)?;
    check_fingerprint(&revision.cipher_fingerprint)?;
    check_abstract(&revision.summary)?;
    check_tags(&revision.tags)
}

/// Reject a self-grant.
pub fn validate_accessor(grantor: &Principal, accessor: &Principal) -> Result<(), ValidationError> {
    if !valid_accessor(accessor, grantor) {
        return Err(ValidationError::InvalidField {
            field: "accessor",
            reason: "accessor must differ from the granting principal".into(),
        });
    }
    Ok(())
}

/// Resolve a grant's tier and check its timespan, in that order.
pub fn validate_grant_terms(tier: &str, timespan: u64) -> Result<Tier, ValidationError> {
    let tier: Tier = tier.parse()?;
    if !valid_timespan(timespan) {
        return Err(ValidationError::TimespanBreach(timespan));
    }
    Ok(tier)
}

/// Validate a grant request and resolve its tier.
///
/// Order: accessor, tier, timespan. The privilege matrix runs the accessor
/// check before any lookup and the terms only after authorization.
pub fn validate_grant(
    grantor: &Principal,
    accessor: &Principal,
    tier: &str,
    timespan: u64,
) -> Result<Tier, ValidationError> {
    validate_accessor(grantor, accessor)?;
    validate_grant_terms(tier, timespan)
}
