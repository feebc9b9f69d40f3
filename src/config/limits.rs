use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Caller-side data access defaults.
///
/// The engine reports "no limit configured" for users without a ceiling on a
/// resource; these fallbacks are what a caller applies in that case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Fallback record ceiling per resource (e.g., `products = 100`).
    #[serde(default)]
    pub fallback: HashMap<String, u32>,
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (resource, limit) in &self.fallback {
            if resource.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "limits.fallback: resource name cannot be empty".into(),
                ));
            }
            if *limit == 0 {
                return Err(ConfigError::Validation(format!(
                    "limits.fallback.{}: fallback must be positive (0 is reserved for unlimited)",
                    resource
                )));
            }
        }
        Ok(())
    }

    pub fn fallback_for(&self, resource: &str) -> Option<u32> {
        self.fallback.get(resource).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fallback_rejected() {
        let mut limits = LimitsConfig::default();
        limits.fallback.insert("orders".to_string(), 0);
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("limits.fallback.orders"));
    }

    #[test]
    fn test_fallback_lookup() {
        let mut limits = LimitsConfig::default();
        limits.fallback.insert("products".to_string(), 100);
        assert!(limits.validate().is_ok());
        assert_eq!(limits.fallback_for("products"), Some(100));
        assert_eq!(limits.fallback_for("orders"), None);
    }
}
