//! Live query tests.
//!
//! Require a MySQL server; set SQU_TEST_ENV to run them.

use super::common::{expected_people, live_squ, without_id};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int64Type};
use pretty_assertions::assert_eq;
use squ::{Backend, QuerySource, SquError};

#[tokio::test]
async fn test_rows_with_file() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let result = squ
        .query_rows(&QuerySource::file("test_query.sql"))
        .await
        .unwrap();

    assert_eq!(
        result.column_names(),
        vec!["id", "first_name", "last_name", "age", "email"]
    );
    assert_eq!(without_id(&result.rows), expected_people());
}

#[tokio::test]
async fn test_rows_with_query() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let from_literal = squ
        .query_rows(&QuerySource::literal("SELECT * FROM test_table;"))
        .await
        .unwrap();
    let from_file = squ
        .query_rows(&QuerySource::file("test_query.sql"))
        .await
        .unwrap();

    assert!(from_literal.same_data(&from_file));
}

#[tokio::test]
async fn test_columnar_with_file() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let batch = squ
        .query_columnar(&QuerySource::file("test_query.sql"))
        .await
        .unwrap();

    assert_eq!(batch.num_rows(), 10);
    let schema = batch.schema();
    assert_eq!(schema.field(1).name(), "first_name");
    assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(3).data_type(), &DataType::Int64);

    let first_names = batch.column(1).as_string::<i32>();
    assert_eq!(first_names.value(0), "John");
    assert_eq!(first_names.value(9), "Hank");

    let ages = batch.column(3).as_primitive::<Int64Type>();
    assert_eq!(ages.null_count(), 0);
    assert_eq!(ages.values().iter().sum::<i64>(), 329);
}

#[tokio::test]
async fn test_partitioned_with_query() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let table = squ
        .query_partitioned(&QuerySource::literal("SELECT * FROM test_table;"))
        .await
        .unwrap();

    assert_eq!(table.partition_sizes(), vec![3, 3, 2, 2]);
    let rows: Vec<_> = table.rows().cloned().collect();
    assert_eq!(without_id(&rows), expected_people());
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let source = QuerySource::literal("SELECT first_name, age FROM test_table WHERE age > 1000");
    for backend in Backend::ALL {
        let result = squ.query(&source, backend).await.unwrap();
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.column_names(), vec!["first_name", "age"]);
    }
}

#[tokio::test]
async fn test_syntax_error_is_query_error() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let source = QuerySource::literal("SELEC * FROM test_table");
    for backend in Backend::ALL {
        let result = squ.query(&source, backend).await;
        match result {
            Err(SquError::Query(msg)) => assert!(msg.contains("1064"), "{msg}"),
            other => panic!("Expected query error, got {other:?}"),
        }
    }
}
