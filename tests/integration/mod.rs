//! Integration tests for squ.

pub mod common;
pub mod dispatch_test;
pub mod query_test;
pub mod view_test;
