//! Rendering of query results for the terminal.

use crate::cli::OutputFormat;
use arrow::util::pretty::pretty_format_batches;
use squ::db::{ColumnInfo, Row};
use squ::{PartitionedTable, Result, SquError, TabularResult};

/// Renders a result in the requested format.
pub fn render(result: &TabularResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => render_json(result),
    }
}

fn render_text(result: &TabularResult) -> Result<String> {
    match result {
        TabularResult::Rows(rows) => Ok(format!(
            "{}\n({} rows in {:.2?})",
            format_table(&rows.columns, rows.rows.iter()),
            rows.row_count,
            rows.execution_time
        )),
        TabularResult::Columnar(batch) => {
            let table = pretty_format_batches(std::slice::from_ref(batch))
                .map_err(|e| SquError::internal(format!("Failed to format result: {e}")))?;
            Ok(format!("{table}\n({} rows)", batch.num_rows()))
        }
        TabularResult::Partitioned(table) => Ok(format!(
            "{}\n({} rows in {} partitions: {})",
            format_table(table.columns(), table.rows()),
            table.row_count(),
            table.num_partitions(),
            partition_summary(table)
        )),
    }
}

fn render_json(result: &TabularResult) -> Result<String> {
    let json = match result {
        TabularResult::Rows(rows) => serde_json::to_string_pretty(rows),
        TabularResult::Partitioned(table) => serde_json::to_string_pretty(table),
        TabularResult::Columnar(_) => {
            return Err(SquError::invalid_argument(
                "JSON output is not available for the columnar backend; use --format text",
            ))
        }
    };
    json.map_err(|e| SquError::internal(format!("Failed to serialize result: {e}")))
}

fn partition_summary(table: &PartitionedTable) -> String {
    table
        .partition_sizes()
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats rows as an aligned text table.
fn format_table<'a>(columns: &[ColumnInfo], rows: impl Iterator<Item = &'a Row>) -> String {
    if columns.is_empty() {
        return "(empty result)".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(|v| v.to_display_string()).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.name.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:w$}", c.name))
        .collect();
    output.push_str(header.join(" │ ").trim_end());
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    output.push_str(&separator.join("─┼─"));
    output.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{cell:width$}")
            })
            .collect();
        output.push_str(line.join(" │ ").trim_end());
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Summary line for `exec`.
pub fn affected_rows(count: u64) -> String {
    match count {
        1 => "1 row affected".to_string(),
        n => format!("{n} rows affected"),
    }
}
