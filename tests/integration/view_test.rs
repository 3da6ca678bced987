//! Live view tests.
//!
//! Require a MySQL server; set SQU_TEST_ENV to run them. Each test uses its
//! own view name so they can run in parallel.

use super::common::{expected_people, live_squ, without_id, PEOPLE};
use pretty_assertions::assert_eq;
use squ::{QuerySource, SquError};

#[tokio::test]
async fn test_create_view_from_file() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    squ.create_view("squ_test_view", &QuerySource::file("test_query.sql"))
        .await
        .unwrap();

    let rows = squ
        .query_rows(&QuerySource::literal("SELECT * FROM squ_test_view"))
        .await
        .unwrap();
    assert_eq!(without_id(&rows.rows), expected_people());

    squ.drop_view("squ_test_view").await.unwrap();
}

#[tokio::test]
async fn test_create_view_from_query() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    squ.create_view(
        "squ_test_view2",
        &QuerySource::literal("SELECT first_name, last_name FROM test_table WHERE age > 30;"),
    )
    .await
    .unwrap();

    let rows = squ
        .query_rows(&QuerySource::literal("SELECT * FROM squ_test_view2"))
        .await
        .unwrap();
    let names: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_display_string()).collect())
        .collect();
    let expected: Vec<Vec<String>> = PEOPLE
        .iter()
        .filter(|(_, _, age)| *age > 30)
        .map(|(first, last, _)| vec![first.to_string(), last.to_string()])
        .collect();
    assert_eq!(names, expected);

    squ.drop_view("squ_test_view2").await.unwrap();
}

#[tokio::test]
async fn test_create_view_replaces_existing() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    squ.create_view("squ_test_view3", &QuerySource::literal("SELECT 1 AS n"))
        .await
        .unwrap();
    squ.create_view("squ_test_view3", &QuerySource::file("test_view_query.sql"))
        .await
        .unwrap();

    let rows = squ
        .query_rows(&QuerySource::literal("SELECT * FROM squ_test_view3"))
        .await
        .unwrap();
    assert_eq!(rows.column_names(), vec!["first_name", "last_name"]);

    squ.drop_view("squ_test_view3").await.unwrap();
}

#[tokio::test]
async fn test_drop_view_makes_it_unreachable() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    squ.create_view("squ_test_view4", &QuerySource::file("test_view_query.sql"))
        .await
        .unwrap();
    squ.drop_view("squ_test_view4").await.unwrap();

    let result = squ
        .query_rows(&QuerySource::literal("SELECT * FROM squ_test_view4"))
        .await;
    match result {
        Err(SquError::Query(msg)) => assert!(msg.contains("1146"), "{msg}"),
        other => panic!("Expected query error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_drop_missing_view_succeeds() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    squ.drop_view("squ_never_created_view").await.unwrap();
}

#[tokio::test]
async fn test_create_view_on_missing_table_fails() {
    let Some(squ) = live_squ().await else {
        eprintln!("Skipping test: SQU_TEST_ENV not set");
        return;
    };

    let result = squ
        .create_view(
            "squ_broken_view",
            &QuerySource::literal("SELECT * FROM squ_no_such_table"),
        )
        .await;
    assert!(matches!(result, Err(SquError::Query(_))));
}
