//! Input validation primitives.
//!
//! Replaces verbose ok_or_else + Error::validation_invalid_argument chains.

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_empty_and_trims() {
        assert_eq!(
            require_non_empty("  value  ", "field", "msg").unwrap(),
            "value"
        );
    }

    #[test]
    fn rejects_empty() {
        assert!(require_non_empty("", "field", "msg").is_err());
    }

    #[test]
    fn rejects_whitespace_only() {
        let err = require_non_empty("   ", "token", "Token must not be empty").unwrap_err();
        assert_eq!(err.message, "Token must not be empty");
        assert_eq!(err.details["field"], "token");
    }
}
