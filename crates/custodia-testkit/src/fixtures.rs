//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use custodia::{Registry, RegistryConfig};
use custodia_core::{Fingerprint, Height, Inscription, Keypair, ManualClock, Principal, Revision};
use custodia_perms::GatePolicy;
use custodia_store::MemoryStore;

/// A registry over a memory store with a manually driven clock.
pub type TestRegistry = Registry<MemoryStore, Arc<ManualClock>>;

/// A test fixture: one principal and helpers for well-formed records.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    pub fn principal(&self) -> Principal {
        self.keypair.principal()
    }

    /// Hex fingerprint of `content`.
    pub fn fingerprint(content: &[u8]) -> String {
        Fingerprint::digest(content).to_hex()
    }

    /// A valid inscription named `designation`.
    pub fn inscription(&self, designation: &str) -> Inscription {
        Inscription::new(
            designation,
            Self::fingerprint(designation.as_bytes()),
            format!("Record for {designation}"),
            "document",
            ["fixture"],
        )
    }

    /// A valid revision named `designation`.
    pub fn revision(&self, designation: &str) -> Revision {
        Revision::new(
            designation,
            Self::fingerprint(designation.as_bytes()),
            format!("Revised record for {designation}"),
            ["fixture", "revised"],
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0xc5;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A memory-backed registry starting at `start`, plus its clock.
pub fn memory_registry(start: u64, policy: GatePolicy) -> (TestRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Height::new(start)));
    let config = RegistryConfig {
        gate: policy,
        ..RegistryConfig::default()
    };
    let registry = Registry::new(MemoryStore::new(), Arc::clone(&clock), config);
    (registry, clock)
}
