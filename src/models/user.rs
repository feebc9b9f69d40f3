use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{
    assignment::{RoleAssignment, ScopeType},
    key::{PermissionKey, normalize_token},
    raw::{RawAssignment, RawPermission, RawRole, RawRoleRef, RawRule, RawUser},
    role::{Role, normalize_role_identifier},
    rule::{Effect, PermissionRule},
};
use crate::authz::AuthzError;

/// How invalid rules in external data are handled during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum RuleValidation {
    /// Fail closed without failing the request: a rule with an unknown effect
    /// is kept as a deny, a structurally invalid rule is dropped. Both are
    /// logged at `warn`.
    #[default]
    Lenient,
    /// Reject the whole user snapshot on the first invalid rule.
    Strict,
}

/// A user snapshot as evaluated by the engine.
///
/// Built once per request, either directly or from a [`RawUser`] via
/// [`User::from_raw`], and never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: Option<String>,
    pub is_super_admin: bool,
    /// Precomputed canonical permission keys. When present, rule-based
    /// assignments are never consulted.
    pub effective_permissions: Option<HashSet<String>>,
    /// Normalized role identifiers from every role collection, in order,
    /// without duplicates.
    pub role_identifiers: Vec<String>,
    pub assignments: Vec<RoleAssignment>,
    /// Per-resource record ceilings, keyed by normalized resource token.
    pub max_data_access: HashMap<String, i64>,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    /// Set the effective-permission cache. Keys are trimmed and lower-cased;
    /// entries that are not a valid `resource:action` pair never match.
    pub fn with_effective_permissions<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.effective_permissions = Some(
            keys.into_iter()
                .map(|key| normalize_token(key.as_ref()))
                .collect(),
        );
        self
    }

    /// Add a role name without any rules.
    pub fn with_role_name(mut self, name: &str) -> Self {
        self.push_identifier(name);
        self
    }

    /// Add a role as a global assignment.
    pub fn with_role(self, role: Role) -> Self {
        self.with_assignment(RoleAssignment::global(role))
    }

    pub fn with_assignment(mut self, assignment: RoleAssignment) -> Self {
        self.add_assignment(assignment);
        self
    }

    pub fn with_max_data_access(mut self, resource: &str, limit: i64) -> Self {
        self.max_data_access.insert(normalize_token(resource), limit);
        self
    }

    pub fn has_effective_permissions(&self) -> bool {
        self.effective_permissions.is_some()
    }

    fn add_assignment(&mut self, assignment: RoleAssignment) {
        let identifier = assignment.role.identifier();
        self.push_identifier(&identifier);
        self.assignments.push(assignment);
    }

    fn push_identifier(&mut self, value: &str) {
        let identifier = normalize_role_identifier(value);
        if !identifier.is_empty() && !self.role_identifiers.contains(&identifier) {
            self.role_identifiers.push(identifier);
        }
    }

    /// Normalize an external user snapshot.
    ///
    /// Role identifiers are collected from `globalRoles`, assignments,
    /// `roles` and `role`, in that order. Populated role objects found in the
    /// legacy collections become global assignments. Effective-permission
    /// keys are re-encoded canonically; malformed ones are dropped with a
    /// warning, or rejected under [`RuleValidation::Strict`].
    pub fn from_raw(raw: RawUser, validation: RuleValidation) -> Result<Self, AuthzError> {
        let mut user = User {
            id: raw.id,
            is_super_admin: raw.is_super_admin,
            ..Default::default()
        };

        if let Some(keys) = raw.effective_permissions {
            let mut canonical = HashSet::with_capacity(keys.len());
            for key in keys {
                match PermissionKey::parse(&key) {
                    Ok(parsed) => {
                        canonical.insert(String::from(parsed));
                    }
                    Err(e) if validation == RuleValidation::Strict => return Err(e),
                    Err(e) => tracing::warn!(
                        user_id = ?user.id,
                        error = %e,
                        "Dropping malformed effective permission"
                    ),
                }
            }
            user.effective_permissions = Some(canonical);
        }

        for role_ref in raw.global_roles {
            user.absorb_role_ref(role_ref, validation)?;
        }
        for assignment in raw.assignments {
            user.absorb_assignment(assignment, validation)?;
        }
        for role_ref in raw.roles {
            user.absorb_role_ref(role_ref, validation)?;
        }
        if let Some(role_ref) = raw.role {
            user.absorb_role_ref(role_ref, validation)?;
        }

        for (resource, limit) in raw.max_data_access {
            let token = normalize_token(&resource);
            match limit {
                Some(limit) if limit > 0 && !token.is_empty() => {
                    user.max_data_access.insert(token, limit);
                }
                // `null` is an explicit "not configured"
                None => {}
                Some(limit) => tracing::warn!(
                    user_id = ?user.id,
                    resource = %resource,
                    limit,
                    "Ignoring invalid data access limit"
                ),
            }
        }

        Ok(user)
    }

    fn absorb_role_ref(
        &mut self,
        role_ref: RawRoleRef,
        validation: RuleValidation,
    ) -> Result<(), AuthzError> {
        match role_ref {
            RawRoleRef::Name(name) => {
                self.push_identifier(&name);
                Ok(())
            }
            RawRoleRef::Role(raw_role) => {
                let role = convert_role(raw_role, validation)?;
                self.add_assignment(RoleAssignment::global(role));
                Ok(())
            }
        }
    }

    fn absorb_assignment(
        &mut self,
        raw: RawAssignment,
        validation: RuleValidation,
    ) -> Result<(), AuthzError> {
        let role = match raw.role {
            RawRoleRef::Name(name) => Role::new(name),
            RawRoleRef::Role(raw_role) => convert_role(raw_role, validation)?,
        };
        let scope_id = match raw.scope_type {
            ScopeType::Global => None,
            _ => raw.scope_id,
        };
        let assignment = RoleAssignment {
            role,
            scope_type: raw.scope_type,
            scope_id,
            scope_model: raw.scope_model,
        };
        self.add_assignment(assignment);
        Ok(())
    }
}

fn convert_role(raw: RawRole, validation: RuleValidation) -> Result<Role, AuthzError> {
    let mut role = Role::new(raw.name).with_scope(raw.scope);
    role.slug = raw.slug;
    for permission in &raw.permissions {
        match permission {
            RawPermission::Rule(raw_rule) => {
                if let Some(rule) = convert_rule(raw_rule, &role, validation)? {
                    role.rules.push(rule);
                }
            }
            RawPermission::Id(id) => tracing::warn!(
                role = %role.identifier(),
                permission_id = %id,
                "Skipping unpopulated permission reference"
            ),
        }
    }
    Ok(role)
}

fn convert_rule(
    raw: &RawRule,
    role: &Role,
    validation: RuleValidation,
) -> Result<Option<PermissionRule>, AuthzError> {
    if validation == RuleValidation::Strict {
        return raw.to_rule().map(Some);
    }

    if let Err(e) = raw.check_structure() {
        tracing::warn!(role = %role.identifier(), error = %e, "Dropping invalid permission rule");
        return Ok(None);
    }

    match raw.parse_effect() {
        Ok(effect) => Ok(Some(raw.build(effect))),
        Err(e) => {
            tracing::warn!(
                role = %role.identifier(),
                error = %e,
                "Permission rule has no valid effect, treating it as deny"
            );
            Ok(Some(raw.build(Effect::Deny)))
        }
    }
}
