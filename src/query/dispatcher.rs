//! Query dispatch.
//!
//! [`Squ`] resolves a query source, builds the connection string the chosen
//! backend needs, runs the statement through the driver, and materializes
//! the result. Every call acquires its own connection and releases it before
//! returning, including on failure.

use crate::config::SquConfig;
use crate::db::{Backend, DatabaseClient, Driver, MySqlDriver, QueryResult};
use crate::error::Result;
use crate::frame::{PartitionedTable, TabularResult};
use crate::logging::diag;
use crate::query::view::{create_view_sql, drop_view_sql};
use crate::query::QuerySource;
use arrow::record_batch::RecordBatch;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Runs SQL against MySQL and returns row, columnar, or partitioned tables.
#[derive(Debug, Clone)]
pub struct Squ<D: Driver = MySqlDriver> {
    config: SquConfig,
    driver: D,
}

impl Squ<MySqlDriver> {
    /// Creates a dispatcher on the sqlx MySQL driver.
    pub fn new(config: SquConfig) -> Self {
        Self::with_driver(config, MySqlDriver::new())
    }

    /// Loads connection parameters from `env_path` and creates a dispatcher.
    pub fn from_env_file(
        env_path: impl AsRef<Path>,
        sql_dir: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        let mut config = SquConfig::load(env_path)?.with_verbose(verbose);
        if let Some(dir) = sql_dir {
            config = config.with_sql_dir(dir);
        }
        Ok(Self::new(config))
    }
}

impl<D: Driver> Squ<D> {
    /// Creates a dispatcher on a custom driver.
    pub fn with_driver(config: SquConfig, driver: D) -> Self {
        Self { config, driver }
    }

    pub fn config(&self) -> &SquConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Runs a query and returns a row-oriented table.
    pub async fn query_rows(&self, source: &QuerySource) -> Result<QueryResult> {
        let sql = self.resolve(source)?;
        let result = self.fetch_via_engine(&sql).await;
        self.report(Backend::Rows, &result);
        result
    }

    /// Runs a query and returns a columnar Arrow table.
    pub async fn query_columnar(&self, source: &QuerySource) -> Result<RecordBatch> {
        let sql = self.resolve(source)?;
        let url = self.config.params().columnar_connection_string();
        diag!(
            self.config.verbose(),
            uri = %self.config.params().redacted_connection_string(None),
            "Created columnar URI"
        );
        diag!(self.config.verbose(), sql = %sql, "Executing SQL with the columnar reader");

        let result = self.driver.read_columnar(&url, &sql).await;
        self.report(Backend::Columnar, &result);
        result
    }

    /// Runs a query and returns the rows split into the configured number of partitions.
    pub async fn query_partitioned(&self, source: &QuerySource) -> Result<PartitionedTable> {
        let sql = self.resolve(source)?;
        let result = self
            .fetch_via_engine(&sql)
            .await
            .map(|rows| PartitionedTable::from_query_result(rows, self.config.partitions()));
        self.report(Backend::Partitioned, &result);
        result
    }

    /// Runs a query on the given backend.
    pub async fn query(&self, source: &QuerySource, backend: Backend) -> Result<TabularResult> {
        match backend {
            Backend::Rows => self.query_rows(source).await.map(TabularResult::Rows),
            Backend::Columnar => self.query_columnar(source).await.map(TabularResult::Columnar),
            Backend::Partitioned => self
                .query_partitioned(source)
                .await
                .map(TabularResult::Partitioned),
        }
    }

    /// Executes a statement and returns the number of rows affected.
    pub async fn execute(&self, source: &QuerySource) -> Result<u64> {
        let sql = self.resolve(source)?;
        self.execute_via_engine(&sql).await
    }

    /// Creates or replaces view `name` defined by the query in `source`.
    pub async fn create_view(&self, name: &str, source: &QuerySource) -> Result<()> {
        let query = self.resolve(source)?;
        let statement = create_view_sql(name, &query)?;
        diag!(self.config.verbose(), sql = %statement, "Creating view");

        match self.execute_via_engine(&statement).await {
            Ok(_) => {
                diag!(self.config.verbose(), "View '{name}' created successfully.");
                Ok(())
            }
            Err(e) => {
                diag!(self.config.verbose(), error = %e, "Failed to create view '{name}'.");
                Err(e)
            }
        }
    }

    /// Drops view `name`. Dropping a view that does not exist succeeds.
    pub async fn drop_view(&self, name: &str) -> Result<()> {
        let statement = drop_view_sql(name)?;
        diag!(self.config.verbose(), sql = %statement, "Dropping view");

        match self.execute_via_engine(&statement).await {
            Ok(_) => {
                diag!(self.config.verbose(), "View '{name}' deleted successfully.");
                Ok(())
            }
            Err(e) => {
                diag!(self.config.verbose(), error = %e, "Failed to delete view '{name}'.");
                Err(e)
            }
        }
    }

    fn resolve(&self, source: &QuerySource) -> Result<String> {
        let sql = source.resolve(&self.config)?;
        diag!(self.config.verbose(), source = %source, sql = %sql, "Resolved query text");
        Ok(sql)
    }

    /// Driver-qualified connection string for the engine path.
    fn engine_url(&self) -> String {
        let params = self.config.params();
        let tag = self.driver.driver_tag();
        diag!(
            self.config.verbose(),
            uri = %params.redacted_connection_string(Some(tag)),
            "Created MySQL URI"
        );
        params.connection_string(Some(tag))
    }

    async fn fetch_via_engine(&self, sql: &str) -> Result<QueryResult> {
        let client = self.driver.connect(&self.engine_url()).await?;
        diag!(self.config.verbose(), sql = %sql, "Executing SQL with the engine");
        let result = client.fetch_rows(sql).await;
        release(client).await;
        result
    }

    async fn execute_via_engine(&self, sql: &str) -> Result<u64> {
        let client = self.driver.connect(&self.engine_url()).await?;
        diag!(self.config.verbose(), sql = %sql, "Executing SQL command");
        let result = client.execute(sql).await;
        release(client).await;
        result
    }

    fn report<T>(&self, backend: Backend, result: &Result<T>) {
        match result {
            Ok(_) => diag!(self.config.verbose(), %backend, "Query succeeded"),
            Err(e) => diag!(
                self.config.verbose(),
                %backend,
                error = %e,
                "An error occurred while executing the query"
            ),
        }
    }
}

async fn release(client: Box<dyn DatabaseClient>) {
    if let Err(e) = client.close().await {
        warn!("Failed to close database client: {e}");
    }
}
