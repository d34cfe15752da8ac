//! Identifier validation, quoting and literal escaping.
//!
//! Database and object names end up inside generated DDL and catalog queries,
//! where they cannot be bound as statement parameters. Every name that reaches
//! SQL text goes through one of these functions first:
//!
//! 1. [`validate_identifier`] rejects empty names, NUL bytes and over-long names
//! 2. `quote_*` applies the dialect's identifier quoting (double quotes, brackets, backticks)
//! 3. [`quote_literal`] escapes a name for use inside a catalog string comparison
//!
//! Fixture DDL keeps names unquoted so that each engine applies its own case
//! folding, which is what the migration engine itself will see. Those names are
//! still validated.

use crate::error::{FixtureError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty or whitespace-only identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `FixtureError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FixtureError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(FixtureError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(FixtureError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Validate a name that will be spliced unquoted into fixture DDL.
///
/// In addition to [`validate_identifier`], rejects characters that would end
/// the statement or open a comment or literal.
pub fn validate_bare_identifier(name: &str) -> Result<()> {
    validate_identifier(name)?;

    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, ';' | '\'' | '"' | '`' | '[' | ']' | '-' | '/' | '*') || c.is_whitespace())
    {
        return Err(FixtureError::Config(format!(
            "Identifier {:?} contains {:?}, which is not allowed in an unquoted name",
            name, c
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
///
/// ```ignore
/// assert_eq!(quote_pg("users")?, "\"users\"");
/// assert_eq!(quote_pg("table\"name")?, "\"table\"\"name\"");
/// ```
pub fn quote_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a MySQL identifier using backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote a SQL Server identifier using brackets.
///
/// ```ignore
/// assert_eq!(quote_mssql("users")?, "[users]");
/// assert_eq!(quote_mssql("table]name")?, "[table]]name]");
/// ```
pub fn quote_mssql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("[{}]", name.replace(']', "]]")))
}

/// Qualify a SQL Server object name with schema.
pub fn qualify_mssql(schema: &str, name: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mssql(schema)?, quote_mssql(name)?))
}

/// Render a name as a single-quoted SQL string literal.
///
/// Used for catalog comparisons such as `WHERE datname = '...'`.
pub fn quote_literal(value: &str) -> Result<String> {
    validate_identifier(value)?;
    Ok(format!("'{}'", value.replace('\'', "''")))
}

/// Render a name as a MySQL string literal.
///
/// MySQL treats backslash as an escape character inside literals by default,
/// so it is doubled as well.
pub fn quote_mysql_literal(value: &str) -> Result<String> {
    validate_identifier(value)?;
    Ok(format!(
        "'{}'",
        value.replace('\\', "\\\\").replace('\'', "''")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("my_table").is_ok());
        assert!(validate_identifier("Table123").is_ok());
        assert!(validate_identifier("column with spaces").is_ok());
        assert!(validate_identifier("日本語").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().to_string().contains("empty"));
        assert!(validate_identifier("   ").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let result = validate_identifier("table\0name");
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        let long_name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let result = validate_identifier(&long_name);
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_validate_identifier_accepts_max_length() {
        let max_name = "a".repeat(MAX_IDENTIFIER_LENGTH);
        assert!(validate_identifier(&max_name).is_ok());
    }

    #[test]
    fn test_validate_bare_identifier() {
        assert!(validate_bare_identifier("Visitor").is_ok());
        assert!(validate_bare_identifier("public.Visitor").is_ok());
        assert!(validate_bare_identifier("script_${Token1}").is_ok());
        assert!(validate_bare_identifier("Visitor; DROP TABLE x").is_err());
        assert!(validate_bare_identifier("Visitor--").is_err());
        assert!(validate_bare_identifier("it's").is_err());
    }

    // =========================================================================
    // Quoting tests
    // =========================================================================

    #[test]
    fn test_quote_pg() {
        assert_eq!(quote_pg("users").unwrap(), "\"users\"");
        assert_eq!(quote_pg("table\"name").unwrap(), "\"table\"\"name\"");
        assert!(quote_pg("table\0name").is_err());
    }

    #[test]
    fn test_quote_pg_sql_injection_safely_quoted() {
        let result = quote_pg("Robert'); DROP TABLE Students;--");
        assert_eq!(result.unwrap(), "\"Robert'); DROP TABLE Students;--\"");
    }

    #[test]
    fn test_quote_mysql() {
        assert_eq!(quote_mysql("users").unwrap(), "`users`");
        assert_eq!(quote_mysql("table`name").unwrap(), "`table``name`");
        assert!(quote_mysql("table\0name").is_err());
    }

    #[test]
    fn test_quote_mssql() {
        assert_eq!(quote_mssql("users").unwrap(), "[users]");
        assert_eq!(quote_mssql("table]name").unwrap(), "[table]]name]");
        assert!(quote_mssql("table\0name").is_err());
    }

    #[test]
    fn test_qualify_mssql() {
        assert_eq!(qualify_mssql("dbo", "users").unwrap(), "[dbo].[users]");
        assert!(qualify_mssql("", "users").is_err());
        assert!(qualify_mssql("dbo", "table\0name").is_err());
    }

    // =========================================================================
    // Literal tests
    // =========================================================================

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("testdb").unwrap(), "'testdb'");
        assert_eq!(quote_literal("o'brien").unwrap(), "'o''brien'");
        assert!(quote_literal("").is_err());
    }

    #[test]
    fn test_quote_mysql_literal_escapes_backslash() {
        assert_eq!(quote_mysql_literal("a\\b").unwrap(), "'a\\\\b'");
        assert_eq!(quote_mysql_literal("o'brien").unwrap(), "'o''brien'");
    }
}
