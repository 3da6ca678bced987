//! MySQL database access using sqlx.
//!
//! [`MySqlDriver`] implements both execution paths: the engine path opens a
//! single-connection pool from a driver-qualified URL, the columnar path opens
//! one bare connection from the plain URL and reads straight into Arrow.

use crate::config::MYSQL_SCHEME;
use crate::db::{statement_body, ColumnInfo, DatabaseClient, Driver, QueryResult, Row, Value};
use crate::error::{Result, SquError};
use crate::frame::columnar;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use sqlx::mysql::{
    MySqlColumn, MySqlConnection, MySqlDatabaseError, MySqlPool, MySqlPoolOptions, MySqlRow,
};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, Connection, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Driver tag accepted in `mysql+<tag>://` connection strings.
pub const ENGINE_DRIVER_TAG: &str = "sqlx";

/// How long the engine waits for its connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// MySQL driver backed by sqlx.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDriver;

impl MySqlDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for MySqlDriver {
    fn driver_tag(&self) -> &str {
        ENGINE_DRIVER_TAG
    }

    async fn connect(&self, url: &str) -> Result<Box<dyn DatabaseClient>> {
        let url = engine_url(url, ENGINE_DRIVER_TAG)?;
        let client = MySqlClient::connect(&url).await?;
        Ok(Box::new(client))
    }

    async fn read_columnar(&self, url: &str, sql: &str) -> Result<RecordBatch> {
        let url = plain_url(url)?;
        let mut conn = MySqlConnection::connect(&url)
            .await
            .map_err(map_connection_error)?;

        let result = fetch_result(&mut conn, sql).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close columnar connection cleanly: {e}");
        }

        columnar::to_record_batch(&result?)
    }
}

/// MySQL client on the engine path.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Opens a single-connection pool from a plain `mysql://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(url)
            .await
            .map_err(map_connection_error)?;

        debug!("Connected to MySQL");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.pool.acquire().await.map_err(map_connection_error)?;
        fetch_result(&mut conn, sql).await
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        // Text protocol: DDL such as CREATE VIEW is not always preparable.
        let done = sqlx::raw_sql(statement_body(sql))
            .execute(&self.pool)
            .await
            .map_err(|e| SquError::query(format_query_error(&e)))?;
        Ok(done.rows_affected())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Runs `sql` on one connection and collects every row.
async fn fetch_result(conn: &mut MySqlConnection, sql: &str) -> Result<QueryResult> {
    let sql = statement_body(sql);
    let start = Instant::now();

    let rows: Vec<MySqlRow> = sqlx::query(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| SquError::query(format_query_error(&e)))?;

    let execution_time = start.elapsed();

    // An empty result carries no row to read column metadata from.
    let columns = match rows.first() {
        Some(row) => column_info(row.columns()),
        None => {
            let statement = (&mut *conn)
                .prepare(sql)
                .await
                .map_err(|e| SquError::query(format_query_error(&e)))?;
            column_info(statement.columns())
        }
    };

    let rows: Vec<Row> = rows.iter().map(convert_row).collect();
    debug!("Fetched {} rows in {:?}", rows.len(), execution_time);

    Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
}

fn column_info(columns: &[MySqlColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Rewrites `mysql+<tag>://...` into the `mysql://...` form sqlx understands.
fn engine_url(url: &str, tag: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| SquError::connection(format!("Invalid connection string: {e}")))?;

    let scheme = parsed.scheme();
    match scheme.strip_prefix(MYSQL_SCHEME) {
        Some("") => Ok(url.to_string()),
        Some(rest) if rest.strip_prefix('+') == Some(tag) => {
            Ok(format!("{MYSQL_SCHEME}{}", &url[scheme.len()..]))
        }
        _ => Err(SquError::connection(format!(
            "Invalid scheme '{scheme}'. Expected '{MYSQL_SCHEME}' or '{MYSQL_SCHEME}+{tag}'"
        ))),
    }
}

/// Accepts only the plain `mysql://` form.
fn plain_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| SquError::connection(format!("Invalid connection string: {e}")))?;

    if parsed.scheme() != MYSQL_SCHEME {
        return Err(SquError::connection(format!(
            "Invalid scheme '{}'. The columnar reader expects '{MYSQL_SCHEME}'",
            parsed.scheme()
        )));
    }
    Ok(url.to_string())
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let data_type = col.type_info().name();
            decoded_or_null(convert_value(row, i, data_type), col.name(), data_type)
        })
        .collect()
}

/// Falls back to NULL for a value that failed to decode, with a warning.
fn decoded_or_null(
    decoded: std::result::Result<Value, sqlx::Error>,
    column: &str,
    data_type: &str,
) -> Value {
    decoded.unwrap_or_else(|e| {
        warn!(column, data_type, "Could not decode value, using NULL: {e}");
        Value::Null
    })
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(
    row: &MySqlRow,
    index: usize,
    type_name: &str,
) -> std::result::Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(index).map(Value::Bool),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).map(Value::Int)
        }

        t if t.ends_with(" UNSIGNED") || t == "YEAR" || t == "BIT" => {
            row.try_get::<u64, _>(index).map(Value::UInt)
        }

        "FLOAT" | "DOUBLE" => row.try_get::<f64, _>(index).map(Value::Float),

        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|d| Value::String(d.to_string())),

        "DATETIME" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|d| Value::String(d.to_string())),

        "TIMESTAMP" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|d| Value::String(d.naive_utc().to_string())),

        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|t| Value::String(t.to_string())),

        // Sent as text even over the binary protocol
        "DECIMAL" | "JSON" => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            row.try_get::<Vec<u8>, _>(index).map(Value::Bytes)
        }

        _ => row.try_get::<String, _>(index).map(Value::String),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error) -> SquError {
    if let Some(db_error) = error.as_database_error() {
        if let Some(mysql_error) = db_error.try_downcast_ref::<MySqlDatabaseError>() {
            return match mysql_error.number() {
                1045 => SquError::connection(format!(
                    "Authentication failed. Check your credentials. ({})",
                    mysql_error.message()
                )),
                1049 => SquError::connection(format!(
                    "Database does not exist. ({})",
                    mysql_error.message()
                )),
                _ => SquError::connection(format_query_error(&error)),
            };
        }
    }

    let error_str = error.to_string().to_lowercase();
    if error_str.contains("connection refused") {
        SquError::connection("Cannot connect to the server. Check that it is running.")
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        SquError::connection(
            "Connection timed out. The server may be overloaded or unreachable.",
        )
    } else {
        SquError::connection(error.to_string())
    }
}

/// Formats an error with the MySQL error number and SQLSTATE when available.
fn format_query_error(error: &sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR");
    if let Some(mysql_error) = db_error.try_downcast_ref::<MySqlDatabaseError>() {
        result.push_str(&format!(" {}", mysql_error.number()));
        if let Some(state) = mysql_error.code() {
            result.push_str(&format!(" ({state})"));
        }
    }
    result.push_str(": ");
    result.push_str(db_error.message());
    result
}
