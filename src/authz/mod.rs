//! Permission resolution.
//!
//! The authorization flow:
//! 1. A missing user is denied
//! 2. Super-admins and organization owners bypass every check
//! 3. Users carrying a precomputed effective-permission set are decided by
//!    exact membership in that set, and rules are never consulted
//! 4. Everyone else is decided by their role rules: highest priority tier
//!    wins, deny wins ties, no matching rule denies
//!
//! Data access ceilings are resolved separately via [`get_limit`].

mod accessor;
mod bypass;
mod cache;
mod engine;
mod error;
mod limits;
mod rules;

use std::sync::LazyLock;

pub use accessor::UserPermissions;
pub use bypass::{BypassReason, bypass_reason, is_bypassed, is_super_admin};
pub use cache::has_effective_permission;
pub use engine::{AuthzEngine, AuthzResult, Decision};
pub use error::AuthzError;
pub use limits::{
    CUSTOMERS, DataAccessLimit, ORDERS, PRODUCTS, UNCONFIGURED, UNLIMITED, resolve_limit,
};
pub use rules::{RuleOutcome, evaluate_rules, explain_rules};

use crate::models::User;

static DEFAULT_ENGINE: LazyLock<AuthzEngine> = LazyLock::new(AuthzEngine::default);

/// Authorize with the default bypass signatures.
pub fn authorize(user: Option<&User>, resource: &str, action: &str) -> bool {
    DEFAULT_ENGINE.authorize(user, resource, action)
}

/// Data access ceiling with the default bypass signatures: `0` unlimited,
/// `-1` unconfigured, otherwise the ceiling.
pub fn get_limit(user: Option<&User>, resource: &str) -> i64 {
    DEFAULT_ENGINE.get_limit(user, resource)
}
