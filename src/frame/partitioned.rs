//! Partitioned row tables.
//!
//! A fetched row table is split into contiguous, balanced partitions so it can
//! be handed out to independent consumers. Row order is preserved across
//! partitions.

use crate::db::{ColumnInfo, QueryResult, Row};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::Duration;

/// A row table split into ordered partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionedTable {
    columns: Vec<ColumnInfo>,
    partitions: Vec<Vec<Row>>,
    #[serde(skip)]
    execution_time: Duration,
}

impl PartitionedTable {
    /// Splits `result` into at most `partitions` partitions.
    ///
    /// The first `rows % partitions` partitions get one extra row. When there
    /// are fewer rows than partitions, each row gets its own partition; an
    /// empty result becomes a single empty partition.
    pub fn from_query_result(result: QueryResult, partitions: NonZeroUsize) -> Self {
        let sizes = partition_sizes(result.rows.len(), partitions.get());
        let mut rows = result.rows.into_iter();
        let partitions = sizes
            .into_iter()
            .map(|size| rows.by_ref().take(size).collect())
            .collect();

        Self {
            columns: result.columns,
            partitions,
            execution_time: result.execution_time,
        }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Returns the rows of partition `index`.
    pub fn partition(&self, index: usize) -> Option<&[Row]> {
        self.partitions.get(index).map(Vec::as_slice)
    }

    pub fn partition_sizes(&self) -> Vec<usize> {
        self.partitions.iter().map(Vec::len).collect()
    }

    /// Total rows across all partitions.
    pub fn row_count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    /// Iterates every row in original order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.partitions.iter().flatten()
    }

    /// Concatenates the partitions back into a single row table.
    pub fn into_query_result(self) -> QueryResult {
        let rows = self.partitions.into_iter().flatten().collect();
        QueryResult::with_data(self.columns, rows).with_execution_time(self.execution_time)
    }
}

/// Balanced partition sizes for `total` rows over at most `parts` partitions.
fn partition_sizes(total: usize, parts: usize) -> Vec<usize> {
    if total == 0 {
        return vec![0];
    }
    let parts = parts.min(total);
    let base = total / parts;
    let extra = total % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}
