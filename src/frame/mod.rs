//! Tabular result types produced by the dispatcher.

pub mod columnar;
mod partitioned;

pub use partitioned::PartitionedTable;

use crate::db::{Backend, QueryResult};
use arrow::record_batch::RecordBatch;

/// A query result materialized into one of the three backends.
#[derive(Debug, Clone)]
pub enum TabularResult {
    /// Row-oriented table.
    Rows(QueryResult),
    /// Columnar Arrow table.
    Columnar(RecordBatch),
    /// Row table split into partitions.
    Partitioned(PartitionedTable),
}

impl TabularResult {
    /// Returns the backend that produced this result.
    pub fn backend(&self) -> Backend {
        match self {
            Self::Rows(_) => Backend::Rows,
            Self::Columnar(_) => Backend::Columnar,
            Self::Partitioned(_) => Backend::Partitioned,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(r) => r.rows.len(),
            Self::Columnar(b) => b.num_rows(),
            Self::Partitioned(p) => p.row_count(),
        }
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            Self::Rows(r) => r.columns.iter().map(|c| c.name.clone()).collect(),
            Self::Columnar(b) => b
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect(),
            Self::Partitioned(p) => p.columns().iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn into_rows(self) -> Option<QueryResult> {
        match self {
            Self::Rows(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_columnar(self) -> Option<RecordBatch> {
        match self {
            Self::Columnar(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_partitioned(self) -> Option<PartitionedTable> {
        match self {
            Self::Partitioned(p) => Some(p),
            _ => None,
        }
    }
}
