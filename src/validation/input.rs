//! Input validation and sanitization utilities.
//!
//! Identifiers for field-set units, record types, members and tables are
//! checked when they are registered. Reserved SQL words are not rejected
//! (the exporter quotes every identifier) but callers can surface them as
//! warnings via [`is_sql_reserved_word`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for identifiers in general
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Maximum length for descriptions
pub const MAX_DESCRIPTION_LENGTH: usize = 10000;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an identifier.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits and underscores
///
/// # Examples
///
/// ```
/// use schema_compose::validation::input::validate_identifier;
///
/// assert!(validate_identifier("UserTrait", "unit name").is_ok());
/// assert!(validate_identifier("first_name", "attribute name").is_ok());
/// assert!(validate_identifier("", "unit name").is_err());
/// assert!(validate_identifier("9lives", "unit name").is_err());
/// ```
pub fn validate_identifier(name: &str, field: &'static str) -> ValidationResult<()> {
    let first_char = match name.chars().next() {
        Some(c) => c,
        None => return Err(ValidationError::Empty(field)),
    };

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENTIFIER_LENGTH,
            actual: name.len(),
        });
    }

    if !first_char.is_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidFormat(
            field,
            "must start with a letter or underscore".to_string(),
        ));
    }

    for c in name.chars() {
        if !c.is_alphanumeric() && c != '_' {
            return Err(ValidationError::InvalidCharacters {
                field,
                reason: format!("invalid character: '{}'", c),
            });
        }
    }

    Ok(())
}

/// Validate a description string.
pub fn validate_description(desc: &str) -> ValidationResult<()> {
    if desc.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description",
            max: MAX_DESCRIPTION_LENGTH,
            actual: desc.len(),
        });
    }

    Ok(())
}

/// Quote a SQL identifier for a dialect, doubling embedded quote characters.
///
/// # Examples
///
/// ```
/// use schema_compose::validation::input::sanitize_sql_identifier;
///
/// assert_eq!(sanitize_sql_identifier("users", "postgres"), "\"users\"");
/// assert_eq!(sanitize_sql_identifier("user-orders", "mysql"), "`user-orders`");
/// assert_eq!(sanitize_sql_identifier("a]b", "sqlserver"), "[a]]b]");
/// ```
pub fn sanitize_sql_identifier(name: &str, dialect: &str) -> String {
    let quote_char = match dialect.to_lowercase().as_str() {
        "mysql" | "mariadb" => '`',
        "sqlserver" | "mssql" => '[',
        _ => '"',
    };

    let end_char = if quote_char == '[' { ']' } else { quote_char };

    let escaped = name.replace(end_char, &format!("{}{}", end_char, end_char));

    format!("{}{}{}", quote_char, escaped, end_char)
}

/// Strip control characters (except newlines and tabs) from a description.
pub fn sanitize_description(desc: &str) -> String {
    desc.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect()
}

/// Check if a word is a SQL reserved word.
///
/// This is a basic check covering common reserved words across SQL dialects.
pub fn is_sql_reserved_word(word: &str) -> bool {
    const RESERVED_WORDS: &[&str] = &[
        "select", "from", "where", "insert", "update", "delete", "create", "drop", "alter",
        "table", "index", "view", "database", "schema", "grant", "revoke", "commit",
        "rollback", "begin", "end", "transaction", "primary", "foreign", "key",
        "references", "constraint", "unique", "check", "default", "not", "null", "and", "or",
        "in", "between", "like", "is", "case", "when", "then", "else", "as", "on", "join",
        "inner", "outer", "left", "right", "full", "cross", "natural", "using", "group", "by",
        "having", "order", "asc", "desc", "limit", "offset", "union", "intersect", "except",
        "all", "distinct", "top", "values", "set", "into", "user", "exec", "execute",
        "procedure", "function", "trigger", "true", "false",
    ];

    let lower = word.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_length_limits() {
        assert!(validate_identifier(&"a".repeat(255), "unit name").is_ok());
        assert!(matches!(
            validate_identifier(&"a".repeat(256), "unit name"),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_identifier_rejects_separators() {
        assert!(matches!(
            validate_identifier("user-name", "attribute name"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            validate_identifier("App\\User", "record type name"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_sql_reserved_word("User"));
        assert!(is_sql_reserved_word("order"));
        assert!(!is_sql_reserved_word("post"));
    }

    #[test]
    fn test_sanitize_description() {
        assert_eq!(sanitize_description("a\u{0007}b\nc"), "ab\nc");
    }
}
