//! Wire shapes for user and role data handed over by the session layer.
//!
//! External data is loosely typed: effects are arbitrary strings, priorities
//! may be missing, and a user's roles can arrive as plain names or populated
//! role objects under several differently-named collections. These types
//! accept all of it; [`crate::models::User::from_raw`] turns them into the
//! typed model the engine evaluates.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::{
    assignment::ScopeType,
    key::normalize_token,
    role::RoleScope,
    rule::{Effect, PermissionRule},
    validators::validate_key_token,
};
use crate::authz::AuthzError;

/// A user snapshot as produced by the session layer.
///
/// Collections may arrive as `null`; that reads the same as an absent field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_super_admin: bool,

    /// Precomputed `resource:action` keys. `null` and absent both mean
    /// "no cache".
    #[serde(default)]
    pub effective_permissions: Option<Vec<String>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub global_roles: Vec<RawRoleRef>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<RawRoleRef>,

    /// Single-role legacy field.
    #[serde(default)]
    pub role: Option<RawRoleRef>,

    #[serde(
        default,
        alias = "roleAssignments",
        deserialize_with = "null_as_default"
    )]
    pub assignments: Vec<RawAssignment>,

    /// Per-resource ceilings. A `null` value means "not configured".
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_data_access: HashMap<String, Option<i64>>,
}

/// Deserialize a field where `null` means the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A role reference: either a bare name or a populated role object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRoleRef {
    Name(String),
    Role(RawRole),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRole {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub scope: RoleScope,

    /// Populated rules, or bare permission ids for roles whose grants live
    /// only in the user's effective-permission set.
    #[serde(default, alias = "rules", deserialize_with = "null_as_default")]
    pub permissions: Vec<RawPermission>,
}

/// A role's permission entry: a populated rule or an unpopulated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPermission {
    Rule(RawRule),
    Id(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignment {
    pub role: RawRoleRef,

    #[serde(default)]
    pub scope_type: ScopeType,

    #[serde(default)]
    pub scope_id: Option<String>,

    #[serde(default)]
    pub scope_model: Option<String>,
}

/// A permission rule as stored externally.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[validate(length(min = 1, max = 128), custom(function = "validate_key_token"))]
    pub resource: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_key_token"))]
    pub action: String,

    /// Expected to be "allow" or "deny"; anything else is invalid.
    #[serde(default)]
    pub effect: String,

    /// Absent priority evaluates as 0.
    #[validate(range(min = -1000000, max = 1000000))]
    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl RawRule {
    /// Check that resource, action and priority are structurally valid.
    pub fn check_structure(&self) -> Result<(), AuthzError> {
        self.validate()
            .map_err(|e| AuthzError::invalid_rule(&self.resource, &self.action, e.to_string()))
    }

    pub fn parse_effect(&self) -> Result<Effect, AuthzError> {
        self.effect
            .parse::<Effect>()
            .map_err(|reason| AuthzError::invalid_rule(&self.resource, &self.action, reason))
    }

    /// Convert into a typed rule, rejecting anything invalid.
    pub fn to_rule(&self) -> Result<PermissionRule, AuthzError> {
        self.check_structure()?;
        let effect = self.parse_effect()?;
        Ok(self.build(effect))
    }

    pub(crate) fn build(&self, effect: Effect) -> PermissionRule {
        PermissionRule {
            resource: normalize_token(&self.resource),
            action: normalize_token(&self.action),
            effect,
            priority: self.priority.unwrap_or(0),
            is_active: self.is_active,
        }
    }
}
