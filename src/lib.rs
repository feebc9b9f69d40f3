//! Scoped permission resolution.
//!
//! Given a user snapshot with role assignments across organizational scopes,
//! [`authz::AuthzEngine`] decides whether a `(resource, action)` pair is
//! permitted and what data access ceiling applies to a resource.
//!
//! ```
//! use rolegate::{
//!     authz::AuthzEngine,
//!     models::{PermissionRule, Role, RoleAssignment, User},
//! };
//!
//! let manager = Role::new("outlet_manager")
//!     .with_rule(PermissionRule::allow("product", "update").with_priority(5));
//! let user = User::new()
//!     .with_assignment(RoleAssignment::outlet(manager, "outlet-7"))
//!     .with_max_data_access("products", 50);
//!
//! let engine = AuthzEngine::default();
//! assert!(engine.authorize(Some(&user), "product", "update"));
//! assert!(!engine.authorize(Some(&user), "product", "delete"));
//! assert_eq!(engine.get_limit(Some(&user), "products"), 50);
//! ```

pub mod authz;
pub mod config;
pub mod models;
#[cfg(feature = "cli")]
pub mod observability;

#[cfg(test)]
mod tests;
