//! Blocking wrapper around [`Squ`].
//!
//! Each call drives the async operation to completion on a fresh
//! current-thread runtime, so callers without an async context can use squ as
//! plain function calls. When the caller is already inside a tokio runtime the
//! operation runs on a scoped worker thread instead, since a runtime cannot be
//! started or blocked on from within another one.

use crate::config::SquConfig;
use crate::db::{Backend, Driver, MySqlDriver, QueryResult};
use crate::error::{Result, SquError};
use crate::frame::{PartitionedTable, TabularResult};
use crate::query::{QuerySource, Squ};
use arrow::record_batch::RecordBatch;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::runtime::{Builder, Handle, Runtime};

/// Synchronous counterpart of [`Squ`].
#[derive(Debug, Clone)]
pub struct BlockingSqu<D: Driver = MySqlDriver> {
    inner: Squ<D>,
}

impl BlockingSqu<MySqlDriver> {
    pub fn new(config: SquConfig) -> Self {
        Self::from_squ(Squ::new(config))
    }

    /// Loads connection parameters from `env_path` and creates a blocking dispatcher.
    pub fn from_env_file(
        env_path: impl AsRef<Path>,
        sql_dir: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        Ok(Self::from_squ(Squ::from_env_file(env_path, sql_dir, verbose)?))
    }
}

impl<D: Driver> BlockingSqu<D> {
    pub fn with_driver(config: SquConfig, driver: D) -> Self {
        Self::from_squ(Squ::with_driver(config, driver))
    }

    /// Wraps an existing dispatcher.
    pub fn from_squ(inner: Squ<D>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Squ<D> {
        &self.inner
    }

    pub fn config(&self) -> &SquConfig {
        self.inner.config()
    }

    pub fn query_rows(&self, source: &QuerySource) -> Result<QueryResult> {
        block_on(|| self.inner.query_rows(source))
    }

    pub fn query_columnar(&self, source: &QuerySource) -> Result<RecordBatch> {
        block_on(|| self.inner.query_columnar(source))
    }

    pub fn query_partitioned(&self, source: &QuerySource) -> Result<PartitionedTable> {
        block_on(|| self.inner.query_partitioned(source))
    }

    pub fn query(&self, source: &QuerySource, backend: Backend) -> Result<TabularResult> {
        block_on(|| self.inner.query(source, backend))
    }

    pub fn execute(&self, source: &QuerySource) -> Result<u64> {
        block_on(|| self.inner.execute(source))
    }

    pub fn create_view(&self, name: &str, source: &QuerySource) -> Result<()> {
        block_on(|| self.inner.create_view(name, source))
    }

    pub fn drop_view(&self, name: &str) -> Result<()> {
        block_on(|| self.inner.drop_view(name))
    }
}

/// Runs the future built by `op` to completion.
///
/// Inside a runtime the work moves to a scoped thread with its own runtime:
/// `Handle::block_on` cannot drive IO on a current-thread runtime whose only
/// thread is the one blocked here.
fn block_on<T, F>(op: impl FnOnce() -> F + Send) -> Result<T>
where
    F: Future<Output = Result<T>>,
    T: Send,
{
    if Handle::try_current().is_err() {
        return runtime()?.block_on(op());
    }

    std::thread::scope(|s| {
        s.spawn(|| runtime()?.block_on(op()))
            .join()
            .map_err(|_| SquError::internal("Blocking worker thread panicked"))?
    })
}

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SquError::internal(format!("Failed to start runtime: {e}")))
}
