use std::fmt;

use crate::{config::BypassConfig, models::User};

/// Why a user skips permission evaluation entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassReason {
    /// The user carries the `is_super_admin` flag.
    SuperAdminFlag,
    /// One of the user's roles matches a super-admin signature.
    SuperAdminRole(String),
    /// One of the user's roles matches an organization-owner signature.
    OwnerRole(String),
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::SuperAdminFlag => f.write_str("super-admin flag"),
            BypassReason::SuperAdminRole(role) => write!(f, "super-admin role '{role}'"),
            BypassReason::OwnerRole(role) => write!(f, "owner role '{role}'"),
        }
    }
}

/// Determine whether, and why, a user bypasses every check.
///
/// The flag is checked before roles; among roles, super-admin signatures are
/// checked before owner signatures so the reported reason is stable.
pub fn bypass_reason(user: &User, roles: &BypassConfig) -> Option<BypassReason> {
    if user.is_super_admin {
        return Some(BypassReason::SuperAdminFlag);
    }

    if let Some(role) = user
        .role_identifiers
        .iter()
        .find(|id| roles.is_super_admin_role(id))
    {
        return Some(BypassReason::SuperAdminRole(role.clone()));
    }

    user.role_identifiers
        .iter()
        .find(|id| roles.is_owner_role(id))
        .map(|role| BypassReason::OwnerRole(role.clone()))
}

/// Whether a user is unconditionally allowed. A missing user never is.
pub fn is_bypassed(user: Option<&User>, roles: &BypassConfig) -> bool {
    user.and_then(|u| bypass_reason(u, roles)).is_some()
}

/// Whether a user is a super-admin by flag or by role.
///
/// Owners bypass permission checks but are not super-admins, so they do not
/// get unlimited data access.
pub fn is_super_admin(user: &User, roles: &BypassConfig) -> bool {
    user.is_super_admin
        || user
            .role_identifiers
            .iter()
            .any(|id| roles.is_super_admin_role(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PermissionRule, Role};

    #[test]
    fn test_missing_user_is_not_bypassed() {
        assert!(!is_bypassed(None, &BypassConfig::default()));
    }

    #[test]
    fn test_super_admin_flag() {
        let user = User::new().with_super_admin(true);
        assert_eq!(
            bypass_reason(&user, &BypassConfig::default()),
            Some(BypassReason::SuperAdminFlag)
        );
        assert!(is_super_admin(&user, &BypassConfig::default()));
    }

    #[test]
    fn test_owner_role_by_slug() {
        let role = Role::new("Business Owner").with_slug("business_owner");
        let user = User::new().with_role(role);
        let reason = bypass_reason(&user, &BypassConfig::default());
        assert_eq!(
            reason,
            Some(BypassReason::OwnerRole("business_owner".to_string()))
        );
        assert!(!is_super_admin(&user, &BypassConfig::default()));
    }

    #[test]
    fn test_super_admin_role_reported_before_owner() {
        let user = User::new()
            .with_role_name("Owner")
            .with_role_name("Super-Admin");
        assert_eq!(
            bypass_reason(&user, &BypassConfig::default()),
            Some(BypassReason::SuperAdminRole("super-admin".to_string()))
        );
    }

    #[test]
    fn test_ordinary_roles_do_not_bypass() {
        let role = Role::new("cashier").with_rule(PermissionRule::allow("orders", "create"));
        let user = User::new().with_role(role).with_role_name("admin");
        assert!(!is_bypassed(Some(&user), &BypassConfig::default()));
    }

    #[test]
    fn test_custom_signatures() {
        let roles = BypassConfig {
            super_admin_roles: vec!["root".to_string()],
            owner_roles: vec!["franchisee".to_string()],
        };
        let owner = User::new().with_role_name("Franchisee");
        let default_owner = User::new().with_role_name("owner");
        assert!(is_bypassed(Some(&owner), &roles));
        assert!(!is_bypassed(Some(&default_owner), &roles));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            BypassReason::OwnerRole("owner".to_string()).to_string(),
            "owner role 'owner'"
        );
    }
}
