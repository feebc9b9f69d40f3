use serde::{Deserialize, Serialize};

use super::rule::PermissionRule;

/// Organizational breadth a role is defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleScope {
    #[default]
    #[serde(alias = "global")]
    Global,
    #[serde(alias = "business")]
    Business,
    #[serde(alias = "outlet")]
    Outlet,
}

/// Normalize a role name or slug into its comparable identifier.
pub fn normalize_role_identifier(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// A role and the rules it grants.
///
/// Newer data carries no rules here; those users rely on the flattened
/// effective-permission set instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub scope: RoleScope,
    #[serde(default)]
    pub rules: Vec<PermissionRule>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            scope: RoleScope::default(),
            rules: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_scope(mut self, scope: RoleScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_rule(mut self, rule: PermissionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: Vec<PermissionRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// The comparable identifier of this role: the slug when one is set,
    /// otherwise the name.
    pub fn identifier(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => normalize_role_identifier(slug),
            _ => normalize_role_identifier(&self.name),
        }
    }
}
