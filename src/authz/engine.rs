use std::fmt;

use super::{
    accessor::UserPermissions,
    bypass::{BypassReason, bypass_reason},
    cache::has_effective_permission,
    error::AuthzError,
    limits::{DataAccessLimit, resolve_limit},
    rules::explain_rules,
};
use crate::{
    config::AccessConfig,
    models::{Effect, User, encode_key, raw::RawUser},
};

/// Which layer of the engine decided a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No user snapshot was provided.
    NoUser,
    /// Super-admin or owner bypass.
    Bypass(BypassReason),
    /// Looked up in the precomputed effective-permission set.
    EffectivePermissions,
    /// Decided by the top-priority tier of matching rules.
    Rule {
        effect: Effect,
        priority: i32,
        role: Option<String>,
    },
    /// No active rule matched (secure default).
    NoMatchingRule,
    /// The request did not form a valid permission key.
    MalformedRequest,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::NoUser => f.write_str("no user"),
            Decision::Bypass(reason) => write!(f, "bypass ({reason})"),
            Decision::EffectivePermissions => f.write_str("effective permissions"),
            Decision::Rule {
                effect,
                priority,
                role,
            } => match role {
                Some(role) => write!(f, "{effect} rule at priority {priority} from role '{role}'"),
                None => write!(f, "{effect} rule at priority {priority}"),
            },
            Decision::NoMatchingRule => f.write_str("no matching rule"),
            Decision::MalformedRequest => f.write_str("malformed request"),
        }
    }
}

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzResult {
    /// Whether access is allowed
    pub allowed: bool,
    /// The layer that made this decision
    pub decision: Decision,
    /// Human-readable reason
    pub reason: Option<String>,
}

impl AuthzResult {
    pub fn allow(decision: Decision) -> Self {
        Self {
            allowed: true,
            decision,
            reason: None,
        }
    }

    pub fn deny(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            decision,
            reason: Some(reason.into()),
        }
    }

    pub fn deny_default() -> Self {
        Self::deny(
            Decision::NoMatchingRule,
            "No matching active rule (default deny)",
        )
    }
}

/// Permission resolution engine.
///
/// Evaluation order: a missing user is denied, bypass users are allowed, users
/// carrying an effective-permission set are decided by that set alone, and
/// everyone else goes through rule evaluation.
///
/// The engine holds only configuration and performs no memoization, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct AuthzEngine {
    config: AccessConfig,
}

impl AuthzEngine {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Normalize an external user snapshot using the configured rule
    /// validation mode.
    pub fn load_user(&self, raw: RawUser) -> Result<User, AuthzError> {
        User::from_raw(raw, self.config.rule_validation)
    }

    /// Bind this engine to one user snapshot.
    pub fn for_user<'a>(&'a self, user: Option<&'a User>) -> UserPermissions<'a> {
        UserPermissions::new(self, user)
    }

    /// Whether `user` may perform `action` on `resource`.
    ///
    /// Never fails: for users that are not bypassed, a pair that does not form
    /// a valid key is denied and logged. Use
    /// [`try_authorize`](Self::try_authorize) to surface it.
    pub fn authorize(&self, user: Option<&User>, resource: &str, action: &str) -> bool {
        self.explain(user, resource, action).allowed
    }

    /// Like [`authorize`](Self::authorize) but reports how the decision was made.
    pub fn explain(&self, user: Option<&User>, resource: &str, action: &str) -> AuthzResult {
        match self.try_authorize(user, resource, action) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    user_id = ?user.and_then(|u| u.id.as_deref()),
                    resource = %resource,
                    action = %action,
                    error = %e,
                    "Denying malformed permission request"
                );
                AuthzResult::deny(Decision::MalformedRequest, e.to_string())
            }
        }
    }

    /// Authorize, surfacing malformed `(resource, action)` pairs as errors.
    ///
    /// A missing user is denied and bypass users are allowed before the key
    /// is built, so only requests that reach the cache or the rules can fail.
    pub fn try_authorize(
        &self,
        user: Option<&User>,
        resource: &str,
        action: &str,
    ) -> Result<AuthzResult, AuthzError> {
        let result = match user {
            None => AuthzResult::deny(Decision::NoUser, "No user"),
            Some(user) => match bypass_reason(user, &self.config.bypass) {
                Some(reason) => {
                    tracing::debug!(
                        user_id = ?user.id,
                        reason = %reason,
                        "Permission check bypassed"
                    );
                    AuthzResult::allow(Decision::Bypass(reason))
                }
                None => {
                    encode_key(resource, action)?;
                    self.evaluate(user, resource, action)
                }
            },
        };
        self.audit(user, resource, action, &result);
        Ok(result)
    }

    fn evaluate(&self, user: &User, resource: &str, action: &str) -> AuthzResult {
        if user.has_effective_permissions() {
            return if has_effective_permission(user, resource, action) {
                AuthzResult::allow(Decision::EffectivePermissions)
            } else {
                AuthzResult::deny(
                    Decision::EffectivePermissions,
                    "Not in effective permissions",
                )
            };
        }

        let outcome = explain_rules(&user.assignments, resource, action);
        match (outcome.deciding_effect, outcome.top_priority) {
            (Some(effect), Some(priority)) => {
                let decision = Decision::Rule {
                    effect,
                    priority,
                    role: outcome.deciding_role,
                };
                if outcome.allowed {
                    AuthzResult::allow(decision)
                } else {
                    let reason = format!("Denied by {decision}");
                    AuthzResult::deny(decision, reason)
                }
            }
            _ => AuthzResult::deny_default(),
        }
    }

    fn audit(&self, user: Option<&User>, resource: &str, action: &str, result: &AuthzResult) {
        let enabled = if result.allowed {
            self.config.audit.log_allowed
        } else {
            self.config.audit.log_denied
        };
        if !enabled {
            return;
        }

        tracing::info!(
            user_id = ?user.and_then(|u| u.id.as_deref()),
            resource = %resource,
            action = %action,
            allowed = result.allowed,
            decision = %result.decision,
            reason = ?result.reason,
            "Authorization decision"
        );
    }

    /// Data access ceiling as a sentinel: `0` unlimited, `-1` unconfigured.
    pub fn get_limit(&self, user: Option<&User>, resource: &str) -> i64 {
        self.resolve_limit(user, resource).as_sentinel()
    }

    pub fn resolve_limit(&self, user: Option<&User>, resource: &str) -> DataAccessLimit {
        resolve_limit(user, resource, &self.config.bypass)
    }
}
