//! Runtime configuration
//!
//! The adapter's sole runtime knob is the zero-hertz feature gate. It is read
//! through the [`FeatureFlags`] port so deployments can wire it to whatever
//! flag delivery mechanism they use; [`CadenceConfig`] is the plain
//! serde-backed implementation.

use serde::{Deserialize, Serialize};

/// Read-only feature gate consulted by the adapter.
pub trait FeatureFlags: Send + Sync {
    /// Whether zero-hertz screenshare cadence may be activated.
    fn zero_hertz_enabled(&self) -> bool;
}

/// Deserializable adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Allow zero-hertz cadence for screenshare sources.
    pub zero_hertz_screenshare: bool,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            zero_hertz_screenshare: true,
        }
    }
}

impl FeatureFlags for CadenceConfig {
    fn zero_hertz_enabled(&self) -> bool {
        self.zero_hertz_screenshare
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_zero_hertz() {
        let config = CadenceConfig::default();
        assert!(config.zero_hertz_enabled());
    }

    #[test]
    fn test_parses_from_json() {
        let config: CadenceConfig =
            serde_json::from_str(r#"{"zero_hertz_screenshare": false}"#).unwrap();
        assert!(!config.zero_hertz_enabled());

        let config: CadenceConfig = serde_json::from_str("{}").unwrap();
        assert!(config.zero_hertz_enabled());
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = CadenceConfig {
            zero_hertz_screenshare: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CadenceConfig = serde_json::from_str(&json).unwrap();
        assert!(!parsed.zero_hertz_enabled());
    }
}
