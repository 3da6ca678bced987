//! squ - SQL utilities for MySQL.
//!
//! Reads connection parameters from an env file, loads SQL from a file or a
//! literal, runs it against MySQL and returns the result as a row table, a
//! columnar Arrow table, or a partitioned table. Views can be created and
//! dropped the same way.

pub mod blocking;
pub mod config;
pub mod db;
pub mod error;
pub mod frame;
pub mod logging;
pub mod query;

pub use blocking::BlockingSqu;
pub use config::{ConnectionParams, SquConfig};
pub use db::{Backend, QueryResult, Value};
pub use error::{Result, SquError};
pub use frame::{PartitionedTable, TabularResult};
pub use query::{QuerySource, Squ};
