//! Row table to Arrow conversion.
//!
//! The Arrow type of each column is chosen from the database type name the
//! driver reported; every field is nullable.

use crate::db::{ColumnInfo, QueryResult, Value};
use crate::error::{Result, SquError};
use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Maps a MySQL type name to the Arrow type used for the column.
pub fn arrow_type(data_type: &str) -> DataType {
    match data_type {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => DataType::Int64,
        t if t.ends_with(" UNSIGNED") || t == "YEAR" || t == "BIT" => DataType::UInt64,
        "FLOAT" | "DOUBLE" => DataType::Float64,
        "BOOLEAN" => DataType::Boolean,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            DataType::Binary
        }
        _ => DataType::Utf8,
    }
}

/// Builds the Arrow schema for a set of result columns.
pub fn schema_for(columns: &[ColumnInfo]) -> SchemaRef {
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(c.name.as_str(), arrow_type(&c.data_type), true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Converts a row table into a single Arrow record batch.
pub fn to_record_batch(result: &QueryResult) -> Result<RecordBatch> {
    let schema = schema_for(&result.columns);
    if result.columns.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut builders: Vec<ColumnBuilder> = schema
        .fields()
        .iter()
        .map(|f| ColumnBuilder::new(f.data_type(), result.rows.len()))
        .collect();

    for (row_index, row) in result.rows.iter().enumerate() {
        if row.len() != builders.len() {
            return Err(SquError::internal(format!(
                "Row {row_index} has {} values, expected {}",
                row.len(),
                builders.len()
            )));
        }
        for ((builder, value), column) in builders.iter_mut().zip(row).zip(&result.columns) {
            builder.append(value).map_err(|found| {
                SquError::internal(format!(
                    "Column '{}' ({}) cannot hold {found} at row {row_index}",
                    column.name, column.data_type
                ))
            })?;
        }
    }

    let arrays: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
    RecordBatch::try_new(schema, arrays)
        .map_err(|e| SquError::internal(format!("Failed to assemble record batch: {e}")))
}

enum ColumnBuilder {
    Int(Int64Builder),
    UInt(UInt64Builder),
    Float(Float64Builder),
    Bool(BooleanBuilder),
    Binary(BinaryBuilder),
    Utf8(StringBuilder),
}

impl ColumnBuilder {
    fn new(data_type: &DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Int64 => Self::Int(Int64Builder::with_capacity(capacity)),
            DataType::UInt64 => Self::UInt(UInt64Builder::with_capacity(capacity)),
            DataType::Float64 => Self::Float(Float64Builder::with_capacity(capacity)),
            DataType::Boolean => Self::Bool(BooleanBuilder::with_capacity(capacity)),
            DataType::Binary => Self::Binary(BinaryBuilder::new()),
            _ => Self::Utf8(StringBuilder::new()),
        }
    }

    /// Appends a value, returning the offending value's kind on a type mismatch.
    fn append(&mut self, value: &Value) -> std::result::Result<(), &'static str> {
        match (self, value) {
            (Self::Int(b), Value::Null) => b.append_null(),
            (Self::UInt(b), Value::Null) => b.append_null(),
            (Self::Float(b), Value::Null) => b.append_null(),
            (Self::Bool(b), Value::Null) => b.append_null(),
            (Self::Binary(b), Value::Null) => b.append_null(),
            (Self::Utf8(b), Value::Null) => b.append_null(),

            (Self::Int(b), Value::Int(v)) => b.append_value(*v),
            (Self::Int(b), Value::UInt(v)) => {
                b.append_value(i64::try_from(*v).map_err(|_| "an out-of-range integer")?)
            }
            (Self::UInt(b), Value::UInt(v)) => b.append_value(*v),
            (Self::UInt(b), Value::Int(v)) => {
                b.append_value(u64::try_from(*v).map_err(|_| "a negative integer")?)
            }
            (Self::Float(b), Value::Float(v)) => b.append_value(*v),
            (Self::Float(b), Value::Int(v)) => b.append_value(*v as f64),
            (Self::Bool(b), Value::Bool(v)) => b.append_value(*v),
            (Self::Bool(b), Value::Int(v)) => b.append_value(*v != 0),
            (Self::Binary(b), Value::Bytes(v)) => b.append_value(v),
            (Self::Binary(b), Value::String(v)) => b.append_value(v.as_bytes()),
            (Self::Utf8(b), other) => b.append_value(other.to_display_string()),

            (_, Value::Bool(_)) => return Err("a boolean"),
            (_, Value::Int(_)) | (_, Value::UInt(_)) => return Err("an integer"),
            (_, Value::Float(_)) => return Err("a float"),
            (_, Value::String(_)) => return Err("a string"),
            (_, Value::Bytes(_)) => return Err("binary data"),
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            Self::Int(mut b) => Arc::new(b.finish()),
            Self::UInt(mut b) => Arc::new(b.finish()),
            Self::Float(mut b) => Arc::new(b.finish()),
            Self::Bool(mut b) => Arc::new(b.finish()),
            Self::Binary(mut b) => Arc::new(b.finish()),
            Self::Utf8(mut b) => Arc::new(b.finish()),
        }
    }
}
