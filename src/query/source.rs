//! Query sources: SQL files or literal text.

use crate::config::SquConfig;
use crate::error::{Result, SquError};
use std::fmt;

/// Where the SQL text of a call comes from.
///
/// The caller states which one it means; a literal is never reinterpreted as
/// a file name or the other way around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Name of a file under the configured SQL directory.
    File(String),
    /// SQL text used as-is.
    Literal(String),
}

impl QuerySource {
    pub fn file(name: impl Into<String>) -> Self {
        Self::File(name.into())
    }

    pub fn literal(sql: impl Into<String>) -> Self {
        Self::Literal(sql.into())
    }

    /// Resolves the SQL text, reading the file for `File` sources.
    ///
    /// The text is trimmed; blank text is rejected.
    pub fn resolve(&self, config: &SquConfig) -> Result<String> {
        let sql = match self {
            Self::File(name) => config.read_sql_file(name)?,
            Self::Literal(sql) => sql.trim().to_string(),
        };

        if sql.is_empty() {
            return Err(SquError::query(format!("Empty SQL statement from {self}")));
        }
        Ok(sql)
    }
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(name) => write!(f, "file {name}"),
            Self::Literal(_) => f.write_str("literal SQL"),
        }
    }
}
