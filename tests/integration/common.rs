//! Shared fixtures for the integration tests.

use squ::db::{ColumnInfo, Value};
use squ::{QueryResult, QuerySource, Squ, SquConfig};
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// The ten people stored in `test_table`: first name, last name, age.
pub const PEOPLE: [(&str, &str, i64); 10] = [
    ("John", "Doe", 28),
    ("Jane", "Doe", 32),
    ("Alice", "Smith", 24),
    ("Bob", "Brown", 45),
    ("Charlie", "Johnson", 35),
    ("David", "Williams", 29),
    ("Eva", "Miller", 31),
    ("Frank", "Davis", 40),
    ("Grace", "Wilson", 27),
    ("Hank", "Moore", 38),
];

pub fn email(first: &str, last: &str) -> String {
    format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase())
}

/// Directory holding the fixture SQL files.
pub fn sql_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("sql")
}

/// `test_table` as a row table, matching the MySQL schema.
pub fn people_table() -> QueryResult {
    let columns = vec![
        ColumnInfo::new("id", "INT"),
        ColumnInfo::new("first_name", "VARCHAR"),
        ColumnInfo::new("last_name", "VARCHAR"),
        ColumnInfo::new("age", "INT"),
        ColumnInfo::new("email", "VARCHAR"),
    ];
    let rows = PEOPLE
        .iter()
        .zip(1..)
        .map(|(&(first, last, age), id)| {
            vec![
                Value::Int(id),
                Value::from(first),
                Value::from(last),
                Value::Int(age),
                Value::String(email(first, last)),
            ]
        })
        .collect();
    QueryResult::with_data(columns, rows)
}

/// Drops the leading `id` column and renders the rest as strings.
pub fn without_id(rows: &[Vec<Value>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().skip(1).map(Value::to_display_string).collect())
        .collect()
}

/// The expected `test_table` contents without the `id` column.
pub fn expected_people() -> Vec<Vec<String>> {
    PEOPLE
        .iter()
        .map(|&(first, last, age)| {
            vec![
                first.to_string(),
                last.to_string(),
                age.to_string(),
                email(first, last),
            ]
        })
        .collect()
}

static TEST_TABLE: OnceCell<()> = OnceCell::const_new();

/// Builds a live dispatcher from the env file in `SQU_TEST_ENV`.
///
/// Returns `None` when the variable is unset. Makes sure `test_table` exists
/// and holds the fixture rows.
pub async fn live_squ() -> Option<Squ> {
    let env_path = std::env::var("SQU_TEST_ENV").ok()?;
    let config = SquConfig::load(&env_path)
        .expect("SQU_TEST_ENV must point at a readable env file")
        .with_sql_dir(sql_dir())
        .with_verbose(true);
    let squ = Squ::new(config);

    TEST_TABLE
        .get_or_try_init(|| seed(&squ))
        .await
        .expect("failed to prepare test_table");
    Some(squ)
}

async fn seed(squ: &Squ) -> squ::Result<()> {
    squ.execute(&QuerySource::file("create_test_table.sql"))
        .await?;
    let count = squ
        .query_rows(&QuerySource::literal("SELECT COUNT(*) AS n FROM test_table"))
        .await?;
    if count.rows[0][0] == Value::Int(0) {
        squ.execute(&QuerySource::file("seed_test_table.sql")).await?;
    }
    Ok(())
}
