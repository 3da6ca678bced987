//! View DDL construction.
//!
//! View names are parsed with the MySQL dialect before they are spliced into
//! a statement, so only a single (optionally qualified) object name gets through.

use crate::db::statement_body;
use crate::error::{Result, SquError};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

/// Parses `name` as a SQL object name and returns its canonical form.
pub fn validate_view_name(name: &str) -> Result<String> {
    let dialect = MySqlDialect {};
    let invalid = |reason: String| {
        SquError::invalid_argument(format!("Invalid view name '{name}': {reason}"))
    };

    let mut parser = Parser::new(&dialect)
        .try_with_sql(name)
        .map_err(|e| invalid(e.to_string()))?;
    let object_name = parser
        .parse_object_name(false)
        .map_err(|e| invalid(e.to_string()))?;

    let next = parser.peek_token().token;
    if next != Token::EOF {
        return Err(invalid(format!("unexpected '{next}' after the name")));
    }
    Ok(object_name.to_string())
}

/// `CREATE OR REPLACE VIEW <name> AS <query>`, with trailing semicolons dropped.
pub fn create_view_sql(name: &str, query: &str) -> Result<String> {
    let name = validate_view_name(name)?;
    Ok(format!(
        "CREATE OR REPLACE VIEW {name} AS {}",
        statement_body(query)
    ))
}

/// `DROP VIEW IF EXISTS <name>`.
pub fn drop_view_sql(name: &str) -> Result<String> {
    let name = validate_view_name(name)?;
    Ok(format!("DROP VIEW IF EXISTS {name}"))
}
