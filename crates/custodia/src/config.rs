//! Registry configuration.

use serde::{Deserialize, Serialize};

use custodia_perms::GatePolicy;

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Access gate policy.
    pub gate: GatePolicy,
    /// Emit a `debug` event for every rejected operation.
    pub log_rejections: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            gate: GatePolicy::default(),
            log_rejections: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(!config.gate.delegated_writes);
        assert!(config.log_rejections);
    }

    #[test]
    fn test_partial_document() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"gate":{"delegated_writes":true}}"#).unwrap();
        assert!(config.gate.delegated_writes);
        assert!(config.log_rejections);

        let config: RegistryConfig = serde_json::from_str(r#"{"log_rejections":false}"#).unwrap();
        assert_eq!(config.gate, GatePolicy::default());
        assert!(!config.log_rejections);
    }
}
