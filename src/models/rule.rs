use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::key::normalize_token;

/// Polarity of a permission rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(format!("unknown effect '{}'", s)),
        }
    }
}

/// One permission rule owned by a role.
///
/// Rules reaching the evaluator have already been validated: tokens are
/// normalized and the effect is a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Resource this rule applies to (e.g., "product", "invoice").
    pub resource: String,
    /// Action this rule applies to (e.g., "read", "update").
    pub action: String,
    pub effect: Effect,
    /// Higher priority rules are authoritative over lower ones.
    pub priority: i32,
    /// Inactive rules never take part in evaluation.
    pub is_active: bool,
}

impl PermissionRule {
    pub fn new(resource: &str, action: &str, effect: Effect) -> Self {
        Self {
            resource: normalize_token(resource),
            action: normalize_token(action),
            effect,
            priority: 0,
            is_active: true,
        }
    }

    pub fn allow(resource: &str, action: &str) -> Self {
        Self::new(resource, action, Effect::Allow)
    }

    pub fn deny(resource: &str, action: &str) -> Self {
        Self::new(resource, action, Effect::Deny)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Whether this rule is an active candidate for `(resource, action)`.
    pub fn applies_to(&self, resource: &str, action: &str) -> bool {
        self.is_active && self.resource == resource && self.action == action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_from_str_is_case_insensitive() {
        assert_eq!("ALLOW".parse::<Effect>(), Ok(Effect::Allow));
        assert_eq!(" deny ".parse::<Effect>(), Ok(Effect::Deny));
        assert!("grant".parse::<Effect>().is_err());
        assert!("".parse::<Effect>().is_err());
    }

    #[test]
    fn test_effect_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Effect::Deny).unwrap(), "\"deny\"");
        let effect: Effect = serde_json::from_str("\"allow\"").unwrap();
        assert_eq!(effect, Effect::Allow);
    }

    #[test]
    fn test_rule_defaults() {
        let rule = PermissionRule::allow("Product", "Update");
        assert_eq!(rule.resource, "product");
        assert_eq!(rule.action, "update");
        assert_eq!(rule.priority, 0);
        assert!(rule.is_active);
    }

    #[test]
    fn test_applies_to() {
        let rule = PermissionRule::deny("invoice", "read").with_priority(10);
        assert!(rule.applies_to("invoice", "read"));
        assert!(!rule.applies_to("invoice", "update"));
        assert!(!rule.applies_to("invoices", "read"));

        let inactive = rule.with_active(false);
        assert!(!inactive.applies_to("invoice", "read"));
    }
}
