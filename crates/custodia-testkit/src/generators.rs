//! Proptest generators for property-based testing.

use proptest::prelude::*;

use custodia_core::validation::{MAX_TIMESPAN, MIN_TIMESPAN};
use custodia_core::{Inscription, Keypair, Principal, Revision, Tier};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random principal.
pub fn principal() -> impl Strategy<Value = Principal> {
    any::<[u8; 32]>().prop_map(Principal::from_bytes)
}

/// Generate a valid designation (1-50 chars).
pub fn designation() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 _-]{0,49}".prop_map(String::from)
}

/// Generate a valid 64-char hex fingerprint.
pub fn fingerprint() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(hex::encode)
}

/// Generate a valid abstract (1-200 chars).
pub fn summary() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,]{1,200}".prop_map(String::from)
}

/// Generate a valid taxonomy (1-20 chars).
pub fn taxonomy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,19}".prop_map(String::from)
}

/// Generate a valid tag (1-30 chars).
pub fn tag() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,30}".prop_map(String::from)
}

/// Generate a valid tag list (1-5 tags).
pub fn tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(tag(), 1..=5)
}

/// Generate a tier.
pub fn tier() -> impl Strategy<Value = Tier> {
    prop_oneof![
        Just(Tier::Observer),
        Just(Tier::Editor),
        Just(Tier::Controller),
    ]
}

/// Generate any accepted tier spelling, aliases included.
pub fn tier_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("observer"),
        Just("editor"),
        Just("controller"),
        Just("read"),
        Just("write"),
        Just("admin"),
    ]
}

/// Generate an accepted grant timespan.
pub fn timespan() -> impl Strategy<Value = u64> {
    MIN_TIMESPAN..=MAX_TIMESPAN
}

/// Parameters for generating an inscription.
#[derive(Debug, Clone)]
pub struct InscriptionParams {
    pub designation: String,
    pub cipher_fingerprint: String,
    pub summary: String,
    pub taxonomy: String,
    pub tags: Vec<String>,
}

impl Arbitrary for InscriptionParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (designation(), fingerprint(), summary(), taxonomy(), tags())
            .prop_map(|(designation, cipher_fingerprint, summary, taxonomy, tags)| {
                InscriptionParams {
                    designation,
                    cipher_fingerprint,
                    summary,
                    taxonomy,
                    tags,
                }
            })
            .boxed()
    }
}

impl InscriptionParams {
    pub fn inscription(&self) -> Inscription {
        Inscription::new(
            self.designation.as_str(),
            self.cipher_fingerprint.as_str(),
            self.summary.as_str(),
            self.taxonomy.as_str(),
            self.tags.iter().map(String::as_str),
        )
    }

    /// The mutable fields of these params, as a revision.
    pub fn revision(&self) -> Revision {
        Revision::new(
            self.designation.as_str(),
            self.cipher_fingerprint.as_str(),
            self.summary.as_str(),
            self.tags.iter().map(String::as_str),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_core::{
        validate_accessor, validate_grant_terms, validate_inscription, validate_revision,
    };

    proptest! {
        #[test]
        fn generated_inscriptions_validate(params: InscriptionParams) {
            prop_assert!(validate_inscription(&params.inscription()).is_ok());
            prop_assert!(validate_revision(&params.revision()).is_ok());
        }

        #[test]
        fn generated_tier_names_parse(name in tier_name()) {
            prop_assert!(Tier::parse(name).is_some());
        }

        #[test]
        fn generated_grant_terms_validate(granted in tier(), span in timespan()) {
            prop_assert_eq!(validate_grant_terms(granted.as_str(), span), Ok(granted));
        }

        #[test]
        fn generated_principals_round_trip_hex(p in principal()) {
            prop_assert_eq!(Principal::from_hex(&p.to_hex()).ok(), Some(p));
            prop_assert!(validate_accessor(&p, &p).is_err());
        }

        #[test]
        fn generated_parties_are_valid_accessors(kp in keypair(), other in principal()) {
            let grantor = kp.principal();
            prop_assume!(grantor != other);
            prop_assert!(validate_accessor(&grantor, &other).is_ok());
        }
    }
}
