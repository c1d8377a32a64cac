//! SQL Identifier Sanitization Utilities
//!
//! Turns developer-facing names into storage-safe identifiers and validates
//! identifiers before they are used to build SQL.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::{Result, StoreError};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("unsafe character pattern is valid"));

static SAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]*$").expect("safe name pattern is valid"));

/// Make a developer-facing name safe for use as a table or column name
///
/// Every character outside `[A-Za-z0-9]` becomes `_` and the result is
/// lower-cased.
///
/// # Example
/// ```
/// use typetable_store::sql::sanitize;
///
/// assert_eq!(sanitize("Customer Order").unwrap(), "customer_order");
/// assert_eq!(sanitize("e-mail").unwrap(), "e_mail");
/// ```
pub fn sanitize(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(StoreError::invalid_input(
            "The provided name cannot be made safe as it is blank",
        ));
    }

    Ok(UNSAFE_CHARS.replace_all(name, "_").to_lowercase())
}

/// Validate that a name only contains lowercase letters, digits and underscores
///
/// The empty string passes. Callers that need a non-empty name check that
/// separately.
///
/// # Example
/// ```
/// use typetable_store::sql::validate_name;
///
/// assert!(validate_name("customer_order").is_ok());
/// assert!(validate_name("Customer Order").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if !SAFE_NAME.is_match(name) {
        return Err(StoreError::invalid_input(format!(
            "The provided name is not valid. The name causing the fault is: '{}'",
            name
        )));
    }
    Ok(())
}

/// Parse a string as a UUID, failing with `InvalidInput` when malformed
pub fn validate_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::invalid_input(format!(
            "The provided identifier is not valid. The value causing this error is: '{}'",
            value
        ))
    })
}

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Example
/// ```
/// use typetable_store::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("typetables"), "\"typetables\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // sanitize Tests
    // =========================================================================

    #[test]
    fn test_sanitize_simple() {
        assert_eq!(sanitize("customer").unwrap(), "customer");
        assert_eq!(sanitize("Customer").unwrap(), "customer");
        assert_eq!(sanitize("ORDER42").unwrap(), "order42");
    }

    #[test]
    fn test_sanitize_replaces_spaces_and_punctuation() {
        assert_eq!(sanitize("Customer Order").unwrap(), "customer_order");
        assert_eq!(sanitize("e-mail").unwrap(), "e_mail");
        assert_eq!(sanitize("a.b@c").unwrap(), "a_b_c");
        assert_eq!(sanitize("x'; DROP TABLE y;--").unwrap(), "x___drop_table_y___");
    }

    #[test]
    fn test_sanitize_replaces_underscore_with_underscore() {
        assert_eq!(sanitize("first_name").unwrap(), "first_name");
    }

    #[test]
    fn test_sanitize_unicode_becomes_underscores() {
        assert_eq!(sanitize("tëst").unwrap(), "t_st");
        assert_eq!(sanitize("日本").unwrap(), "__");
    }

    #[test]
    fn test_sanitize_empty_fails() {
        let err = sanitize("").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_sanitize_is_idempotent_on_word_names() {
        for name in ["Customer", "first_name", "Order_Line_2", "ABC", "a1"] {
            let once = sanitize(name).unwrap();
            assert_eq!(sanitize(&once).unwrap(), once, "not idempotent for {}", name);
        }
    }

    #[test]
    fn test_sanitize_output_always_passes_validation() {
        for name in ["Customer Order", "e-mail", "tëst", "A.B.C", "$$$", "MiXeD 42!"] {
            let safe = sanitize(name).unwrap();
            assert!(
                safe.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "unexpected characters in {}",
                safe
            );
            assert!(validate_name(&safe).is_ok());
        }
    }

    // =========================================================================
    // validate_name Tests
    // =========================================================================

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("customer").is_ok());
        assert!(validate_name("customer_order").is_ok());
        assert!(validate_name("_leading").is_ok());
        assert!(validate_name("123").is_ok());
    }

    #[test]
    fn test_validate_name_empty_is_valid() {
        assert!(validate_name("").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_uppercase() {
        assert!(validate_name("Customer").is_err());
        assert!(validate_name("myTable").is_err());
    }

    #[test]
    fn test_validate_name_rejects_injection() {
        let err = validate_name("x' OR '1'='1").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("x' OR '1'='1"));
    }

    #[test]
    fn test_validate_name_rejects_special_chars() {
        assert!(validate_name("my-table").is_err());
        assert!(validate_name("my.table").is_err());
        assert!(validate_name("my table").is_err());
        assert!(validate_name("my\ntable").is_err());
    }

    // =========================================================================
    // validate_uuid Tests
    // =========================================================================

    #[test]
    fn test_validate_uuid_valid() {
        let id = "0b6f2c3e-7a8d-4e2b-9f41-3c5d6e7f8a9b";
        assert_eq!(validate_uuid(id).unwrap().to_string(), id);
    }

    #[test]
    fn test_validate_uuid_invalid() {
        let err = validate_uuid("not-a-uuid").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("not-a-uuid"));
        assert!(validate_uuid("").is_err());
    }

    // =========================================================================
    // quote_identifier Tests
    // =========================================================================

    #[test]
    fn test_quote_identifier_simple() {
        assert_eq!(quote_identifier("typetables"), "\"typetables\"");
    }

    #[test]
    fn test_quote_identifier_with_quotes() {
        assert_eq!(
            quote_identifier("table\"with\"quotes"),
            "\"table\"\"with\"\"quotes\""
        );
    }
}
