//! Command-line argument parsing for squ.

use clap::{Args, Parser, Subcommand, ValueEnum};
use squ::{Backend, QuerySource};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text table.
    #[default]
    Text,
    /// JSON document.
    Json,
}

/// Run SQL against MySQL and get the result back as a table.
#[derive(Parser, Debug)]
#[command(name = "squ")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Env file holding DB_HOST, DB_USER, DB_PASSWORD, DB_NAME and DB_PORT
    #[arg(long, value_name = "PATH", default_value = ".env", global = true)]
    pub env: PathBuf,

    /// Directory that --file names are resolved against
    #[arg(long, value_name = "DIR", env = "SQU_SQL_DIR", global = true)]
    pub sql_dir: Option<PathBuf>,

    /// Number of partitions for the partitioned backend
    #[arg(long, value_name = "N", global = true)]
    pub partitions: Option<NonZeroUsize>,

    /// Log connection strings, SQL text and outcomes
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a query and print the result
    Query {
        /// Backend to materialize the result into (rows, columnar, partitioned)
        #[arg(short, long, value_name = "BACKEND", default_value = "rows")]
        backend: Backend,

        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create or replace a view defined by a query
    CreateView {
        /// View name, optionally qualified with a database
        name: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Drop a view if it exists
    DropView {
        /// View name, optionally qualified with a database
        name: String,
    },

    /// Execute a statement and print the number of affected rows
    Exec {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where the SQL text comes from. Exactly one must be given.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Name of a SQL file under --sql-dir
    #[arg(short, long, value_name = "NAME")]
    pub file: Option<String>,

    /// Literal SQL text
    #[arg(short, long, value_name = "SQL")]
    pub sql: Option<String>,
}

impl SourceArgs {
    pub fn to_source(&self) -> QuerySource {
        match (&self.file, &self.sql) {
            (Some(name), _) => QuerySource::file(name.clone()),
            (None, Some(sql)) => QuerySource::literal(sql.clone()),
            // clap's argument group guarantees one of the two.
            (None, None) => QuerySource::literal(String::new()),
        }
    }
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
