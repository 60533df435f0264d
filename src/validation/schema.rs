//! SQL validation helpers

use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// Pick the sqlparser dialect matching an export dialect name
pub fn parser_dialect(dialect: &str) -> Box<dyn Dialect> {
    match dialect {
        "postgres" | "postgresql" => Box::new(PostgreSqlDialect {}),
        "mysql" => Box::new(MySqlDialect {}),
        "sqlserver" | "mssql" => Box::new(MsSqlDialect {}),
        _ => Box::new(GenericDialect {}),
    }
}

/// Parse SQL into statements
pub fn parse_statements(content: &str, dialect: &str) -> Result<Vec<Statement>, String> {
    let dialect = parser_dialect(dialect);
    Parser::parse_sql(dialect.as_ref(), content).map_err(|e| format!("SQL validation failed: {}", e))
}

/// Validate that SQL content parses
pub fn validate_sql(content: &str, dialect: &str) -> Result<(), String> {
    parse_statements(content, dialect).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sql() {
        assert!(validate_sql("CREATE TABLE \"t\" (\"id\" INT NOT NULL);", "postgres").is_ok());
        assert!(validate_sql("CREATE TABLE (", "standard").is_err());
    }
}
