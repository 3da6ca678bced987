//! Mock database driver for testing.
//!
//! Provides an in-memory driver that answers `SELECT * FROM <name>` for
//! fixture tables and views, exact-match registered queries, and keeps track
//! of views created and dropped through it.

use super::{statement_body, DatabaseClient, Driver, QueryResult};
use crate::error::{Result, SquError};
use crate::frame::columnar;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

const CREATE_VIEW: &str = "CREATE OR REPLACE VIEW ";
const DROP_VIEW_IF_EXISTS: &str = "DROP VIEW IF EXISTS ";
const DROP_VIEW: &str = "DROP VIEW ";
const SELECT_ALL_FROM: &str = "SELECT * FROM ";

/// Views can be defined on views; stop following them past this depth.
const MAX_VIEW_DEPTH: usize = 16;

#[derive(Debug, Default)]
struct MockState {
    tables: HashMap<String, QueryResult>,
    queries: HashMap<String, QueryResult>,
    views: HashMap<String, String>,
    urls: Vec<String>,
    statements: Vec<String>,
    open_clients: usize,
}

/// A mock driver backed by shared in-memory state.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing the driver to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
    failing: bool,
}

impl MockDriver {
    /// Creates a new mock driver with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver whose every connection attempt fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Adds a fixture table answered by `SELECT * FROM <name>`.
    pub fn with_table(self, name: impl Into<String>, table: QueryResult) -> Self {
        self.lock().tables.insert(name.into(), table);
        self
    }

    /// Registers the result for an exact statement text.
    pub fn with_query(self, sql: &str, result: QueryResult) -> Self {
        self.lock()
            .queries
            .insert(statement_body(sql).to_string(), result);
        self
    }

    /// Connection strings seen by `connect` and `read_columnar`, in order.
    pub fn connected_urls(&self) -> Vec<String> {
        self.lock().urls.clone()
    }

    /// Statements passed to `execute`, in order.
    pub fn executed_statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    /// Returns the defining query of a view, if it exists.
    pub fn view_definition(&self, name: &str) -> Option<String> {
        self.lock().views.get(name).cloned()
    }

    /// Clients handed out by `connect` that have not been closed yet.
    pub fn open_clients(&self) -> usize {
        self.lock().open_clients
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn refuse(&self) -> Result<()> {
        if self.failing {
            return Err(SquError::connection(
                "Cannot connect to the server. Check that it is running.",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for MockDriver {
    fn driver_tag(&self) -> &str {
        "mock"
    }

    async fn connect(&self, url: &str) -> Result<Box<dyn DatabaseClient>> {
        let mut state = self.lock();
        state.urls.push(url.to_string());
        self.refuse()?;
        state.open_clients += 1;

        Ok(Box::new(MockClient {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }))
    }

    async fn read_columnar(&self, url: &str, sql: &str) -> Result<RecordBatch> {
        let result = {
            let mut state = self.lock();
            state.urls.push(url.to_string());
            self.refuse()?;
            answer(&state, sql, 0)?
        };
        columnar::to_record_batch(&result)
    }
}

/// A client handed out by [`MockDriver::connect`].
struct MockClient {
    state: Arc<Mutex<MockState>>,
    closed: AtomicBool,
}

impl MockClient {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DatabaseClient for MockClient {
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult> {
        answer(&self.lock(), sql, 0)
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let mut state = self.lock();
        let sql = statement_body(sql);
        state.statements.push(sql.to_string());

        if let Some(rest) = strip_prefix_ignore_case(sql, CREATE_VIEW) {
            let split = rest
                .to_ascii_uppercase()
                .find(" AS ")
                .ok_or_else(|| SquError::query("ERROR 1064 (42000): missing AS in view"))?;
            let name = rest[..split].trim().to_string();
            let body = rest[split + 4..].trim().to_string();
            state.views.insert(name, body);
        } else if let Some(name) = strip_prefix_ignore_case(sql, DROP_VIEW_IF_EXISTS) {
            state.views.remove(name.trim());
        } else if let Some(name) = strip_prefix_ignore_case(sql, DROP_VIEW) {
            if state.views.remove(name.trim()).is_none() {
                return Err(SquError::query(format!(
                    "ERROR 1051 (42S02): Unknown table '{}'",
                    name.trim()
                )));
            }
        }
        Ok(0)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.lock().open_clients -= 1;
        }
        Ok(())
    }
}

fn answer(state: &MockState, sql: &str, depth: usize) -> Result<QueryResult> {
    let sql = statement_body(sql);
    if let Some(result) = state.queries.get(sql) {
        return Ok(result.clone());
    }

    let Some(name) = strip_prefix_ignore_case(sql, SELECT_ALL_FROM).map(str::trim) else {
        return Err(SquError::query(format!(
            "ERROR 1064 (42000): mock cannot answer '{sql}'"
        )));
    };

    if let Some(table) = state.tables.get(name) {
        return Ok(table.clone());
    }
    match state.views.get(name) {
        Some(body) if depth < MAX_VIEW_DEPTH => answer(state, body, depth + 1),
        _ => Err(SquError::query(format!(
            "ERROR 1146 (42S02): Table '{name}' doesn't exist"
        ))),
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}
