//! Read-only check for generated SQL.

use crate::types::{Result, SqlRagError};
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Accept only a single `SELECT` (or `WITH ... SELECT`) statement.
///
/// # Errors
///
/// Returns `SqlRagError::SqlRejected` for unparseable SQL, multiple
/// statements, or anything that is not a query
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql)
        .map_err(|e| SqlRagError::SqlRejected(format!("unparseable SQL: {}", e)))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [] => Err(rejected("empty statement")),
        [_] => Err(rejected("only SELECT statements may be executed")),
        _ => Err(rejected("multiple statements are not allowed")),
    }
}

fn rejected(reason: &str) -> SqlRagError {
    SqlRagError::SqlRejected(reason.to_string())
}
