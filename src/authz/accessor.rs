use super::{bypass::is_bypassed, engine::AuthzEngine, limits::DataAccessLimit};
use crate::models::User;

/// Permission checks bound to one user snapshot.
///
/// Holds no state of its own: every call re-evaluates against the snapshot it
/// borrows. Any caching across calls is up to the caller.
#[derive(Debug, Clone, Copy)]
pub struct UserPermissions<'a> {
    engine: &'a AuthzEngine,
    user: Option<&'a User>,
}

impl<'a> UserPermissions<'a> {
    pub fn new(engine: &'a AuthzEngine, user: Option<&'a User>) -> Self {
        Self { engine, user }
    }

    pub fn user(&self) -> Option<&'a User> {
        self.user
    }

    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.engine.authorize(self.user, resource, action)
    }

    /// True when at least one of `checks` is allowed. An empty list is false.
    pub fn can_any(&self, checks: &[(&str, &str)]) -> bool {
        checks
            .iter()
            .any(|(resource, action)| self.can(resource, action))
    }

    /// True when every one of `checks` is allowed. An empty list is true.
    pub fn can_all(&self, checks: &[(&str, &str)]) -> bool {
        checks
            .iter()
            .all(|(resource, action)| self.can(resource, action))
    }

    /// Data access ceiling as a sentinel (`0` unlimited, `-1` unconfigured).
    pub fn limit(&self, resource: &str) -> i64 {
        self.engine.get_limit(self.user, resource)
    }

    pub fn data_limit(&self, resource: &str) -> DataAccessLimit {
        self.engine.resolve_limit(self.user, resource)
    }

    pub fn is_bypassed(&self) -> bool {
        is_bypassed(self.user, &self.engine.config().bypass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PermissionRule, Role};

    fn clerk() -> User {
        let role = Role::new("clerk").with_rules(vec![
            PermissionRule::allow("orders", "read"),
            PermissionRule::allow("orders", "create"),
        ]);
        User::new().with_role(role).with_max_data_access("orders", 30)
    }

    #[test]
    fn test_can_any_and_all() {
        let engine = AuthzEngine::default();
        let user = clerk();
        let perms = engine.for_user(Some(&user));

        assert!(perms.can("orders", "read"));
        assert!(perms.can_any(&[("orders", "delete"), ("orders", "create")]));
        assert!(!perms.can_any(&[("orders", "delete")]));
        assert!(perms.can_all(&[("orders", "read"), ("orders", "create")]));
        assert!(!perms.can_all(&[("orders", "read"), ("orders", "delete")]));
    }

    #[test]
    fn test_empty_check_lists() {
        let engine = AuthzEngine::default();
        let user = clerk();
        let perms = engine.for_user(Some(&user));
        assert!(!perms.can_any(&[]));
        assert!(perms.can_all(&[]));
    }

    #[test]
    fn test_limits() {
        let engine = AuthzEngine::default();
        let user = clerk();
        let perms = engine.for_user(Some(&user));
        assert_eq!(perms.limit("orders"), 30);
        assert_eq!(perms.limit("products"), -1);
        assert_eq!(perms.data_limit("orders"), DataAccessLimit::Ceiling(30));
    }

    #[test]
    fn test_missing_user() {
        let engine = AuthzEngine::default();
        let perms = engine.for_user(None);
        assert!(!perms.can("orders", "read"));
        assert!(!perms.is_bypassed());
        assert_eq!(perms.limit("orders"), -1);
        assert!(perms.user().is_none());
    }

    #[test]
    fn test_reflects_new_snapshot() {
        let engine = AuthzEngine::default();
        let before = clerk();
        let after = before.clone().with_super_admin(true);

        assert!(!engine.for_user(Some(&before)).can("orders", "delete"));
        assert!(engine.for_user(Some(&after)).can("orders", "delete"));
        assert!(engine.for_user(Some(&after)).is_bypassed());
    }
}
