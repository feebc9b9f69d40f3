use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::models::{RuleValidation, normalize_role_identifier};

/// Access decision configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Role signatures that bypass every check.
    #[serde(default)]
    pub bypass: BypassConfig,

    /// Audit logging configuration for authorization decisions.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Handling of invalid rules when normalizing external user data.
    /// Defaults to "lenient" (invalid effects degrade to deny).
    #[serde(default)]
    pub rule_validation: RuleValidation,
}

impl AccessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bypass.validate()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bypass roles
// ─────────────────────────────────────────────────────────────────────────────

/// Role signatures granting unconditional access.
///
/// Signatures are compared against a user's normalized role identifiers with
/// `-` and spaces folded to `_`, so `Super Admin`, `super-admin` and
/// `super_admin` all match the `super_admin` signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct BypassConfig {
    /// Super-admin role signatures. Also unlock unlimited data access.
    #[serde(default = "default_super_admin_roles")]
    pub super_admin_roles: Vec<String>,

    /// Organization-owner role signatures.
    #[serde(default = "default_owner_roles")]
    pub owner_roles: Vec<String>,
}

impl Default for BypassConfig {
    fn default() -> Self {
        Self {
            super_admin_roles: default_super_admin_roles(),
            owner_roles: default_owner_roles(),
        }
    }
}

fn default_super_admin_roles() -> Vec<String> {
    vec!["super_admin".to_string(), "superadmin".to_string()]
}

fn default_owner_roles() -> Vec<String> {
    vec![
        "owner".to_string(),
        "org_owner".to_string(),
        "organization_owner".to_string(),
        "business_owner".to_string(),
    ]
}

/// Fold a role identifier into its comparable signature.
pub fn role_signature(identifier: &str) -> String {
    normalize_role_identifier(identifier).replace(['-', ' '], "_")
}

impl BypassConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = self.super_admin_roles.iter().chain(&self.owner_roles);
        for (i, role) in all.enumerate() {
            if role.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "access.bypass: role signature {} is empty",
                    i
                )));
            }
        }
        Ok(())
    }

    pub fn is_super_admin_role(&self, identifier: &str) -> bool {
        let signature = role_signature(identifier);
        self.super_admin_roles
            .iter()
            .any(|r| role_signature(r) == signature)
    }

    pub fn is_owner_role(&self, identifier: &str) -> bool {
        let signature = role_signature(identifier);
        self.owner_roles.iter().any(|r| role_signature(r) == signature)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audit
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for authorization decision audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Log allowed authorization decisions.
    /// Defaults to false (only denied decisions are logged).
    #[serde(default)]
    pub log_allowed: bool,

    /// Log denied authorization decisions.
    #[serde(default = "default_true")]
    pub log_denied: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_allowed: false,
            log_denied: true,
        }
    }
}

fn default_true() -> bool {
    true
}
