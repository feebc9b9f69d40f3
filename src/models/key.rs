//! Canonical permission keys.
//!
//! A permission key identifies one checkable capability as `resource:action`.
//! Both tokens are trimmed and lower-cased before encoding, must be non-empty,
//! and must not contain the separator.
//!
//! | Input                    | Result                        |
//! |--------------------------|-------------------------------|
//! | `("Orders", "Delete")`   | `orders:delete`               |
//! | `("", "read")`           | `MalformedKey` (empty token)  |
//! | `("a:b", "read")`        | `MalformedKey` (separator)    |

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::authz::AuthzError;

/// Separator between the resource and action halves of a key.
pub const KEY_SEPARATOR: char = ':';

/// Normalize a resource or action token to the stored casing convention.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}

fn checked_token(kind: &str, token: &str, key: &str) -> Result<String, AuthzError> {
    let normalized = normalize_token(token);
    if normalized.is_empty() {
        return Err(AuthzError::malformed_key(key, format!("{kind} is empty")));
    }
    if normalized.contains(KEY_SEPARATOR) {
        return Err(AuthzError::malformed_key(
            key,
            format!("{kind} contains '{KEY_SEPARATOR}'"),
        ));
    }
    Ok(normalized)
}

/// Encode a `(resource, action)` pair as a canonical key string.
pub fn encode_key(resource: &str, action: &str) -> Result<String, AuthzError> {
    let raw = format!("{resource}{KEY_SEPARATOR}{action}");
    let resource = checked_token("resource", resource, &raw)?;
    let action = checked_token("action", action, &raw)?;
    Ok(format!("{resource}{KEY_SEPARATOR}{action}"))
}

/// Decode a key string into its `(resource, action)` halves.
///
/// Fails unless the input contains exactly one separator with a non-empty
/// token on each side.
pub fn decode_key(key: &str) -> Result<(String, String), AuthzError> {
    let separators = key.matches(KEY_SEPARATOR).count();
    if separators != 1 {
        return Err(AuthzError::malformed_key(
            key,
            format!("expected exactly one '{KEY_SEPARATOR}' separator, found {separators}"),
        ));
    }
    let (resource, action) = key
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| AuthzError::malformed_key(key, "missing separator"))?;
    Ok((
        checked_token("resource", resource, key)?,
        checked_token("action", action, key)?,
    ))
}

/// A validated `resource:action` key.
///
/// Serializes as the plain key string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey {
    key: String,
    split: usize,
}

impl PermissionKey {
    pub fn new(resource: &str, action: &str) -> Result<Self, AuthzError> {
        let key = encode_key(resource, action)?;
        let split = key.find(KEY_SEPARATOR).unwrap_or(key.len());
        Ok(Self { key, split })
    }

    pub fn parse(key: &str) -> Result<Self, AuthzError> {
        let (resource, action) = decode_key(key)?;
        Self::new(&resource, &action)
    }

    pub fn resource(&self) -> &str {
        &self.key[..self.split]
    }

    pub fn action(&self) -> &str {
        &self.key[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn into_parts(self) -> (String, String) {
        (self.resource().to_string(), self.action().to_string())
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for PermissionKey {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PermissionKey> for String {
    fn from(key: PermissionKey) -> Self {
        key.key
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_encode_normalizes_case_and_whitespace() {
        assert_eq!(encode_key("Orders", " DELETE ").unwrap(), "orders:delete");
    }

    #[rstest]
    #[case::empty_resource("", "read")]
    #[case::blank_action("product", "   ")]
    #[case::separator_in_resource("a:b", "read")]
    #[case::separator_in_action("product", "re:ad")]
    fn test_encode_rejects_malformed_tokens(#[case] resource: &str, #[case] action: &str) {
        let err = encode_key(resource, action).unwrap_err();
        assert!(err.is_malformed_key(), "unexpected error: {err}");
    }

    #[rstest]
    #[case::products("products", "read")]
    #[case::orders("orders", "delete")]
    #[case::underscored("price_rules", "manage")]
    #[case::hyphenated("cash-drawer", "open")]
    fn test_decode_inverts_encode(#[case] resource: &str, #[case] action: &str) {
        let key = encode_key(resource, action).unwrap();
        assert_eq!(
            decode_key(&key).unwrap(),
            (resource.to_string(), action.to_string())
        );
    }

    #[rstest]
    #[case::no_separator("noSeparatorHere")]
    #[case::two_separators("a:b:c")]
    #[case::empty_half(":read")]
    #[case::empty_action("product:")]
    #[case::empty_input("")]
    fn test_decode_rejects_malformed_keys(#[case] key: &str) {
        let err = decode_key(key).unwrap_err();
        assert!(err.is_malformed_key(), "unexpected error: {err}");
    }

    #[test]
    fn test_permission_key_accessors() {
        let key = PermissionKey::new("Invoice", "Read").unwrap();
        assert_eq!(key.resource(), "invoice");
        assert_eq!(key.action(), "read");
        assert_eq!(key.as_str(), "invoice:read");
        assert_eq!(key.to_string(), "invoice:read");
    }

    #[test]
    fn test_permission_key_from_str() {
        let key: PermissionKey = "orders:void".parse().unwrap();
        assert_eq!(key.into_parts(), ("orders".to_string(), "void".to_string()));
        assert!("orders".parse::<PermissionKey>().is_err());
    }

    #[test]
    fn test_permission_key_serde_as_string() {
        let key = PermissionKey::new("orders", "refund").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"orders:refund\"");

        let back: PermissionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);

        assert!(serde_json::from_str::<PermissionKey>("\"a:b:c\"").is_err());
    }
}
