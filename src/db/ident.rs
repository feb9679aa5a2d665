// Validation for names that get interpolated into SQL statements
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Get the regex accepting safe table and column names
fn ident_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // ASCII letters, digits and underscores, not starting with a digit
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
    })
}

/// Check that a table or column name is safe to embed in a statement.
///
/// Bound parameters never go through this; only names that end up inside
/// generated SQL text do.
pub fn validate_ident(name: &str) -> Result<()> {
    if ident_regex().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

/// Render a name for embedding in a statement.
/// Callers validate first, so no quote escaping is needed here.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names() {
        assert!(validate_ident("users").is_ok());
        assert!(validate_ident("play_counts").is_ok());
        assert!(validate_ident("_staging").is_ok());
        assert!(validate_ident("t2").is_ok());
    }

    #[test]
    fn test_leading_digit() {
        assert!(validate_ident("2fast").is_err());
    }

    #[test]
    fn test_empty_name() {
        assert!(validate_ident("").is_err());
    }

    #[test]
    fn test_whitespace() {
        assert!(validate_ident("user table").is_err());
        assert!(validate_ident(" users").is_err());
    }

    #[test]
    fn test_injection_attempts() {
        assert!(validate_ident("users; DROP TABLE users").is_err());
        assert!(validate_ident("users\"").is_err());
        assert!(validate_ident("users--").is_err());
    }

    #[test]
    fn test_non_ascii() {
        assert!(validate_ident("tablé").is_err());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("users"), "\"users\"");
    }
}
