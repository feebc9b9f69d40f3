use crate::models::{User, encode_key};

/// Check a `(resource, action)` pair against the user's precomputed
/// effective-permission set.
///
/// Membership is an exact string match on the canonical key; there is no
/// wildcard or prefix matching. A user without a set, or a pair that does not
/// encode to a valid key, is never granted anything here.
pub fn has_effective_permission(user: &User, resource: &str, action: &str) -> bool {
    let Some(permissions) = &user.effective_permissions else {
        return false;
    };
    match encode_key(resource, action) {
        Ok(key) => permissions.contains(&key),
        Err(_) => false,
    }
}
