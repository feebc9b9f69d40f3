use std::fmt;

use super::bypass::is_super_admin;
use crate::{
    config::BypassConfig,
    models::{User, normalize_token},
};

pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";
pub const CUSTOMERS: &str = "customers";

/// Sentinel returned for super-admins.
pub const UNLIMITED: i64 = 0;
/// Sentinel returned when no ceiling is configured for the resource.
pub const UNCONFIGURED: i64 = -1;

/// Maximum number of records of one resource type a user may retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataAccessLimit {
    Unlimited,
    /// No ceiling configured; the caller picks the fallback.
    Unconfigured,
    Ceiling(u32),
}

impl DataAccessLimit {
    /// The wire form: `0` unlimited, `-1` unconfigured, otherwise the ceiling.
    pub fn as_sentinel(&self) -> i64 {
        match self {
            DataAccessLimit::Unlimited => UNLIMITED,
            DataAccessLimit::Unconfigured => UNCONFIGURED,
            DataAccessLimit::Ceiling(n) => i64::from(*n),
        }
    }

    /// Apply a caller-side fallback. Returns None when there is no cap.
    pub fn or_fallback(self, fallback: u32) -> Option<u32> {
        match self {
            DataAccessLimit::Unlimited => None,
            DataAccessLimit::Unconfigured => Some(fallback),
            DataAccessLimit::Ceiling(n) => Some(n),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, DataAccessLimit::Unlimited)
    }
}

impl fmt::Display for DataAccessLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAccessLimit::Unlimited => f.write_str("unlimited"),
            DataAccessLimit::Unconfigured => f.write_str("unconfigured"),
            DataAccessLimit::Ceiling(n) => write!(f, "{n}"),
        }
    }
}

/// Resolve the data access ceiling for `resource`.
///
/// Super-admins (by flag or role) are unlimited. Organization owners are not:
/// they bypass permission checks but still read their configured ceiling.
/// The resource is matched case-insensitively against the user's ceilings.
pub fn resolve_limit(user: Option<&User>, resource: &str, roles: &BypassConfig) -> DataAccessLimit {
    let Some(user) = user else {
        return DataAccessLimit::Unconfigured;
    };
    if is_super_admin(user, roles) {
        return DataAccessLimit::Unlimited;
    }

    match user.max_data_access.get(&normalize_token(resource)) {
        Some(&limit) if limit > 0 => {
            DataAccessLimit::Ceiling(u32::try_from(limit).unwrap_or(u32::MAX))
        }
        _ => DataAccessLimit::Unconfigured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> BypassConfig {
        BypassConfig::default()
    }

    fn get_limit(user: Option<&User>, resource: &str, roles: &BypassConfig) -> i64 {
        resolve_limit(user, resource, roles).as_sentinel()
    }

    #[test]
    fn test_super_admin_is_unlimited() {
        let user = User::new()
            .with_super_admin(true)
            .with_max_data_access(PRODUCTS, 10);
        assert_eq!(get_limit(Some(&user), PRODUCTS, &roles()), 0);
        assert!(resolve_limit(Some(&user), ORDERS, &roles()).is_unlimited());
    }

    #[test]
    fn test_super_admin_role_is_unlimited() {
        let user = User::new().with_role_name("SuperAdmin");
        assert_eq!(get_limit(Some(&user), CUSTOMERS, &roles()), 0);
    }

    #[test]
    fn test_owner_reads_configured_limit() {
        let user = User::new()
            .with_role_name("owner")
            .with_max_data_access(ORDERS, 75);
        assert_eq!(get_limit(Some(&user), ORDERS, &roles()), 75);
        assert_eq!(get_limit(Some(&user), PRODUCTS, &roles()), -1);
    }

    #[test]
    fn test_configured_and_missing() {
        let user = User::new().with_max_data_access(PRODUCTS, 50);
        assert_eq!(
            resolve_limit(Some(&user), PRODUCTS, &roles()),
            DataAccessLimit::Ceiling(50)
        );
        assert_eq!(get_limit(Some(&user), "Products", &roles()), 50);
        assert_eq!(get_limit(Some(&user), CUSTOMERS, &roles()), -1);
        assert_eq!(get_limit(Some(&user), "warehouses", &roles()), -1);
    }

    #[test]
    fn test_mixed_case_ceiling_from_raw_data() {
        let raw = serde_json::from_str(r#"{"maxDataAccess": {"Products": 50}}"#).unwrap();
        let user = User::from_raw(raw, Default::default()).unwrap();
        assert_eq!(get_limit(Some(&user), PRODUCTS, &roles()), 50);
        assert_eq!(get_limit(Some(&user), "PRODUCTS", &roles()), 50);
    }

    #[test]
    fn test_missing_user_is_unconfigured() {
        assert_eq!(get_limit(None, PRODUCTS, &roles()), -1);
    }

    #[test]
    fn test_non_positive_values_are_unconfigured() {
        let user = User::new()
            .with_max_data_access(PRODUCTS, 0)
            .with_max_data_access(ORDERS, -7);
        assert_eq!(get_limit(Some(&user), PRODUCTS, &roles()), -1);
        assert_eq!(get_limit(Some(&user), ORDERS, &roles()), -1);
    }

    #[test]
    fn test_oversized_value_saturates() {
        let user = User::new().with_max_data_access(ORDERS, i64::MAX);
        assert_eq!(
            resolve_limit(Some(&user), ORDERS, &roles()),
            DataAccessLimit::Ceiling(u32::MAX)
        );
    }

    #[test]
    fn test_or_fallback() {
        assert_eq!(DataAccessLimit::Unlimited.or_fallback(100), None);
        assert_eq!(DataAccessLimit::Unconfigured.or_fallback(100), Some(100));
        assert_eq!(DataAccessLimit::Ceiling(20).or_fallback(100), Some(20));
    }

    #[test]
    fn test_display() {
        assert_eq!(DataAccessLimit::Unlimited.to_string(), "unlimited");
        assert_eq!(DataAccessLimit::Ceiling(5).to_string(), "5");
    }
}
