//! Configuration management for squ.
//!
//! Handles loading MySQL connection parameters from a `.env` style file,
//! building the two connection-string forms, and reading SQL text from
//! files under the configured SQL directory.

use crate::error::{Result, SquError};
use crate::logging::diag;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// URL scheme used for every connection string.
pub const MYSQL_SCHEME: &str = "mysql";

/// Number of partitions used by the partitioned backend unless overridden.
pub const DEFAULT_PARTITIONS: usize = 4;

/// Env keys read from the connection file.
const KEY_HOST: &str = "DB_HOST";
const KEY_USER: &str = "DB_USER";
const KEY_PASSWORD: &str = "DB_PASSWORD";
const KEY_NAME: &str = "DB_NAME";
const KEY_PORT: &str = "DB_PORT";

/// Everything outside the RFC 3986 unreserved set gets encoded in userinfo.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// MySQL connection parameters.
///
/// Values are kept as raw strings: nothing is validated, and a key missing
/// from the source becomes an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    host: String,
    user: String,
    password: String,
    database: String,
    port: String,
}

impl ConnectionParams {
    /// Extracts the five `DB_*` keys from a flat mapping. Other keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();
        Self {
            host: get(KEY_HOST),
            user: get(KEY_USER),
            password: get(KEY_PASSWORD),
            database: get(KEY_NAME),
            port: get(KEY_PORT),
        }
    }

    /// Parses a `.env` file without touching the process environment.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            SquError::config(format!("Failed to read env file {}: {e}", path.display()))
        })?;

        let mut map = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                SquError::config(format!("Invalid env file {}: {e}", path.display()))
            })?;
            map.insert(key, value);
        }

        Ok(Self::from_map(&map))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Builds `mysql[+driver]://user:password@host:port/database`.
    ///
    /// User and password are percent-encoded; the other parts are used as-is.
    pub fn connection_string(&self, driver: Option<&str>) -> String {
        self.format_uri(driver, &encode_userinfo(&self.password))
    }

    /// Builds the plain `mysql://` form used by the columnar bulk reader.
    pub fn columnar_connection_string(&self) -> String {
        self.connection_string(None)
    }

    /// Same as [`connection_string`](Self::connection_string) with the password masked, for logs.
    pub fn redacted_connection_string(&self, driver: Option<&str>) -> String {
        let password = if self.password.is_empty() { "" } else { "***" };
        self.format_uri(driver, password)
    }

    fn format_uri(&self, driver: Option<&str>, password: &str) -> String {
        let scheme = match driver {
            Some(tag) => format!("{MYSQL_SCHEME}+{tag}"),
            None => MYSQL_SCHEME.to_string(),
        };
        format!(
            "{scheme}://{}:{password}@{}:{}/{}",
            encode_userinfo(&self.user),
            self.host,
            self.port,
            self.database
        )
    }

    /// Returns a display-safe string (no credentials).
    pub fn display_string(&self) -> String {
        format!("{} @ {}:{}", self.database, self.host, self.port)
    }
}

fn encode_userinfo(value: &str) -> String {
    utf8_percent_encode(value, USERINFO).to_string()
}

/// Runtime configuration for a [`Squ`](crate::query::Squ) instance.
///
/// Connection parameters are loaded once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SquConfig {
    params: ConnectionParams,
    sql_dir: Option<PathBuf>,
    verbose: bool,
    partitions: NonZeroUsize,
}

impl SquConfig {
    /// Wraps already loaded connection parameters with default settings.
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            sql_dir: None,
            verbose: false,
            partitions: default_partitions(),
        }
    }

    /// Loads connection parameters from the env file at `env_path`.
    pub fn load(env_path: impl AsRef<Path>) -> Result<Self> {
        let params = ConnectionParams::from_env_file(env_path.as_ref())?;
        Ok(Self::new(params))
    }

    /// Sets the directory `QuerySource::File` names are resolved against.
    pub fn with_sql_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sql_dir = Some(dir.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the partition count of the partitioned backend.
    pub fn with_partitions(mut self, partitions: NonZeroUsize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn sql_dir(&self) -> Option<&Path> {
        self.sql_dir.as_deref()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn partitions(&self) -> NonZeroUsize {
        self.partitions
    }

    /// Reads and trims the SQL text of `name` under the SQL directory.
    pub fn read_sql_file(&self, name: &str) -> Result<String> {
        let dir = self.sql_dir.as_deref().ok_or_else(|| {
            SquError::config(format!(
                "Cannot read SQL file {name}: no SQL directory configured"
            ))
        })?;

        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let query = content.trim().to_string();
                diag!(self.verbose, file = %name, sql = %query, "Read SQL from file");
                Ok(query)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                diag!(self.verbose, file = %name, "SQL file not found");
                Err(SquError::sql_file(format!(
                    "The file {name} was not found in {}",
                    dir.display()
                )))
            }
            Err(e) => {
                diag!(self.verbose, file = %name, error = %e, "Failed to read SQL file");
                Err(SquError::sql_file(format!(
                    "An error occurred while reading {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

fn default_partitions() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PARTITIONS).unwrap_or(NonZeroUsize::MIN)
}
