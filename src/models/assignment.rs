use serde::{Deserialize, Serialize};

use super::role::Role;

/// Kind of organizational entity an assignment is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeType {
    #[default]
    Global,
    #[serde(alias = "business_unit", alias = "business")]
    BusinessUnit,
    Outlet,
}

/// Binds a user to a role at one scope instance.
///
/// Scope fields are descriptive: the rule evaluator flattens rules from every
/// assignment regardless of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    #[serde(default)]
    pub scope_type: ScopeType,
    /// Identifier of the scoped entity (None when global).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    /// Which entity kind `scope_id` refers to (e.g., "BusinessUnit", "Outlet").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_model: Option<String>,
}

impl RoleAssignment {
    pub fn global(role: Role) -> Self {
        Self {
            role,
            scope_type: ScopeType::Global,
            scope_id: None,
            scope_model: None,
        }
    }

    pub fn business_unit(role: Role, business_unit_id: impl Into<String>) -> Self {
        Self {
            role,
            scope_type: ScopeType::BusinessUnit,
            scope_id: Some(business_unit_id.into()),
            scope_model: Some("BusinessUnit".to_string()),
        }
    }

    pub fn outlet(role: Role, outlet_id: impl Into<String>) -> Self {
        Self {
            role,
            scope_type: ScopeType::Outlet,
            scope_id: Some(outlet_id.into()),
            scope_model: Some("Outlet".to_string()),
        }
    }

    pub fn with_scope_model(mut self, scope_model: impl Into<String>) -> Self {
        self.scope_model = Some(scope_model.into());
        self
    }
}
