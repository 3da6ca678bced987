//! Database abstraction layer for squ.
//!
//! Provides a trait-based interface over the MySQL driver so the dispatcher
//! can run against the real server or the in-memory mock interchangeably.

mod mock;
mod mysql;
mod types;

pub use mock::MockDriver;
pub use mysql::{MySqlClient, MySqlDriver};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::{Result, SquError};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Tabular backends a query result can be materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Row-oriented table ([`QueryResult`]) fetched through the engine.
    Rows,
    /// Columnar Arrow table read in bulk from the plain URL.
    Columnar,
    /// Row table fetched through the engine, then split into partitions.
    Partitioned,
}

impl Backend {
    /// All backends, in declaration order.
    pub const ALL: [Backend; 3] = [Backend::Rows, Backend::Columnar, Backend::Partitioned];

    /// Returns the canonical backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Columnar => "columnar",
            Self::Partitioned => "partitioned",
        }
    }

    /// Whether this backend executes through the generic engine path
    /// (driver-qualified URL) rather than the bulk columnar reader.
    pub fn uses_engine(&self) -> bool {
        !matches!(self, Self::Columnar)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = SquError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rows" | "table" => Ok(Self::Rows),
            "columnar" | "arrow" => Ok(Self::Columnar),
            "partitioned" | "distributed" => Ok(Self::Partitioned),
            _ => Err(SquError::invalid_argument(format!(
                "Unsupported backend: {s}. Expected: rows, columnar, or partitioned"
            ))),
        }
    }
}

/// Opens database access for the dispatcher.
///
/// Each call is expected to acquire its own connection; callers close the
/// returned client when done.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Driver tag placed in driver-qualified connection strings (`mysql+<tag>://`).
    fn driver_tag(&self) -> &str;

    /// Opens a client on the generic engine path from a driver-qualified URL.
    async fn connect(&self, url: &str) -> Result<Box<dyn DatabaseClient>>;

    /// Reads the result of `sql` directly into a columnar table from a plain URL.
    async fn read_columnar(&self, url: &str, sql: &str) -> Result<RecordBatch>;
}

/// Trait defining the interface for database clients.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a query and fetches every row.
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult>;

    /// Executes a statement and returns the number of rows affected.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// Strips surrounding whitespace and trailing semicolons from a statement.
pub fn statement_body(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}
