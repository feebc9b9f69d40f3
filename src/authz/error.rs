//! Authorization errors.
//!
//! Only structurally invalid input is an error. A permission that is simply
//! not granted is a normal deny outcome and never surfaces here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("Malformed permission key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Invalid permission rule '{resource}:{action}': {reason}")]
    InvalidRule {
        resource: String,
        action: String,
        reason: String,
    },
}

impl AuthzError {
    pub fn malformed_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_rule(
        resource: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRule {
            resource: resource.into(),
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the key codec.
    pub fn is_malformed_key(&self) -> bool {
        matches!(self, Self::MalformedKey { .. })
    }
}
