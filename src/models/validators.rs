use std::borrow::Cow;

use validator::ValidationError;

use super::key::KEY_SEPARATOR;

/// Validate a resource or action token.
///
/// Ensures that:
/// - The token is not empty or whitespace-only
/// - The token does not contain the key separator
pub fn validate_key_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        let mut err = ValidationError::new("empty_token");
        err.message = Some(Cow::Borrowed(
            "Resource and action cannot be empty or whitespace-only",
        ));
        return Err(err);
    }
    if token.contains(KEY_SEPARATOR) {
        let mut err = ValidationError::new("separator_in_token");
        err.message = Some(Cow::Owned(format!(
            "Resource and action cannot contain '{}'",
            KEY_SEPARATOR
        )));
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_token() {
        assert!(validate_key_token("product").is_ok());
        assert!(validate_key_token("price_rules").is_ok());

        let err = validate_key_token("  ").unwrap_err();
        assert_eq!(err.code, "empty_token");

        let err = validate_key_token("orders:void").unwrap_err();
        assert_eq!(err.code, "separator_in_token");
    }
}
