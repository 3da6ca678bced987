//! Error types for squ.
//!
//! Every fallible operation in the crate returns [`SquError`]. Failures are
//! reported as values, never as panics, so callers can tell "no rows" apart
//! from "the query failed".

use thiserror::Error;

/// Main error type for squ operations.
#[derive(Error, Debug)]
pub enum SquError {
    /// Database connection errors (host unreachable, auth failed, bad URL, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, missing tables or views, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (unreadable env file, missing SQL directory, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A SQL file could not be found or read.
    #[error("SQL file error: {0}")]
    SqlFile(String),

    /// The caller passed something that can never succeed (unknown backend, bad view name).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal errors (unexpected states, runtime setup, table assembly).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SquError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a SQL file error with the given message.
    pub fn sql_file(msg: impl Into<String>) -> Self {
        Self::SqlFile(msg.into())
    }

    /// Creates an invalid-argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::SqlFile(_) => "SQL File Error",
            Self::InvalidArgument(_) => "Invalid Argument",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SquError.
pub type Result<T> = std::result::Result<T, SquError>;
