use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

const NO_DATA: &str = "No data available.";

/// Renders `data` to stdout, or to `output` when given.
///
/// `columns` picks and orders the table columns of a list. Without it the keys
/// of the first row are used.
pub async fn render(
    data: &Value,
    format: OutputFormat,
    title: Option<&str>,
    columns: Option<&[&str]>,
    output: Option<&Path>,
) -> Result<()> {
    let Some(text) = render_to_string(data, format, title, columns)? else {
        print_warning(NO_DATA);
        return Ok(());
    };

    match output {
        Some(path) => fs::write(path, format!("{text}\n"))
            .await
            .with_context(|| format!("Failed to write output to {path:?}")),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

/// Returns `None` when there is nothing to show as a table.
pub fn render_to_string(
    data: &Value,
    format: OutputFormat,
    title: Option<&str>,
    columns: Option<&[&str]>,
) -> Result<Option<String>> {
    if format == OutputFormat::Json {
        return Ok(Some(to_json(data)?));
    }

    match data {
        Value::Null => Ok(None),
        Value::Object(map) => match columns {
            Some(_) => Ok(Some(list_table(
                map,
                std::slice::from_ref(data),
                title,
                columns,
            ))),
            None => Ok(Some(dict_table(map, title))),
        },
        Value::Array(rows) if rows.is_empty() => Ok(None),
        Value::Array(rows) => match rows.first() {
            Some(Value::Object(first)) => Ok(Some(list_table(first, rows, title, columns))),
            _ => Ok(Some(to_json(data)?)),
        },
        _ => Ok(Some(to_json(data)?)),
    }
}

fn to_json(data: &Value) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize output to JSON")
}

/// Table cell text. Nested values become compact JSON, nulls a dash.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn dict_table(map: &Map<String, Value>, title: Option<&str>) -> String {
    let rows = map
        .iter()
        .map(|(key, value)| vec![key.clone(), cell(Some(value))])
        .collect();
    format_table(title, vec!["Field".to_string(), "Value".to_string()], rows)
}

fn list_table(
    first: &Map<String, Value>,
    rows: &[Value],
    title: Option<&str>,
    columns: Option<&[&str]>,
) -> String {
    let columns: Vec<String> = match columns {
        Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
        None => first.keys().cloned().collect(),
    };
    let body = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| cell(row.get(column)))
                .collect()
        })
        .collect();
    format_table(title, columns, body)
}

/// Borderless, left-aligned columns separated by two spaces.
fn format_table(title: Option<&str>, headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if let Some(title) = title {
        lines.push(title.to_string());
    }
    lines.push(format_row(&headers));
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}

pub fn print_success(message: &str) {
    eprintln!("{message}");
}

pub fn print_warning(message: &str) {
    eprintln!("{message}");
}
