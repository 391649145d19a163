//! Common CLI types and utilities shared across commands.
//!
//! Every command that prints results accepts the same `--format` flag and
//! writes through the helpers here, so table, JSON and CSV output look the
//! same across `short-circuit`, `ct` and `report`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tabwriter::TabWriter;
use tft_algo::ReportField;

/// Output format for tabular/structured data.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable aligned table (default for interactive use)
    #[default]
    Table,
    /// JSON object (pipe-friendly, structured)
    Json,
    /// Comma-separated values
    Csv,
}

/// Output destination that can be a file path or stdout.
#[derive(Clone, Debug)]
pub enum OutputDest {
    /// Write to a file path
    File(PathBuf),
    /// Write to stdout (specified as "-")
    Stdout,
}

impl OutputDest {
    /// Parse from a string argument. "-" means stdout, anything else is a file path.
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Returns true if this is stdout
    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    /// Open the destination for writing, creating parent directories.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(io::stdout())),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory: {}", parent.display())
                    })?;
                }
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

/// Write data as JSON to the given writer.
pub fn write_json<W: Write, T: Serialize>(
    data: &T,
    writer: &mut W,
    pretty: bool,
) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, data).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut *writer, data).map_err(io::Error::other)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write serializable rows as CSV with a header line.
pub fn write_csv<W: Write, T: Serialize>(rows: &[T], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row).context("Failed to write CSV row")?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a tab-aligned table.
pub fn write_table<W: Write>(headers: &[&str], rows: &[Vec<String>], writer: W) -> Result<()> {
    let mut tw = TabWriter::new(writer);
    writeln!(tw, "{}", headers.join("\t"))?;
    for row in rows {
        writeln!(tw, "{}", row.join("\t"))?;
    }
    tw.flush()?;
    Ok(())
}

/// Flat CSV/table row for a [`ReportField`]
#[derive(Debug, Serialize)]
pub struct FieldRow<'a> {
    pub section: &'a str,
    pub label: &'a str,
    pub value: String,
    pub unit: &'a str,
}

impl<'a> From<&'a ReportField> for FieldRow<'a> {
    fn from(field: &'a ReportField) -> Self {
        Self {
            section: field.section,
            label: &field.label,
            value: field.value.to_string(),
            unit: field.unit.unwrap_or(""),
        }
    }
}

/// Render label/value pairs as a table or CSV. JSON callers serialize the
/// underlying record instead.
pub fn write_fields<W: Write>(
    fields: &[ReportField],
    format: OutputFormat,
    writer: W,
) -> Result<()> {
    let rows: Vec<FieldRow<'_>> = fields.iter().map(FieldRow::from).collect();
    match format {
        OutputFormat::Csv => write_csv(&rows, writer),
        OutputFormat::Table | OutputFormat::Json => {
            let table: Vec<Vec<String>> = rows
                .into_iter()
                .map(|r| vec![r.label.to_string(), r.value, r.unit.to_string()])
                .collect();
            write_table(&["QUANTITY", "VALUE", "UNIT"], &table, writer)
        }
    }
}


#[cfg(test)]
mod format_writer_tests {
    use super::*;
    use tft_algo::ReportValue;

    fn sample_fields() -> Vec<ReportField> {
        vec![
            ReportField {
                section: "short_circuit",
                label: "Line current".to_string(),
                value: ReportValue::Number(606.3347),
                unit: Some("A"),
            },
            ReportField {
                section: "ct_check",
                label: "Sequence ok".to_string(),
                value: ReportValue::Flag(true),
                unit: None,
            },
        ]
    }

    #[test]
    fn test_write_json_to_string() {
        let data = serde_json::json!({"line_current_a": 606.33});
        let mut output = Vec::new();
        write_json(&data, &mut output, false).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert!(result.contains("line_current_a"));
        assert!(result.ends_with('\n'));
    }

    #[test]
    fn test_write_fields_csv_keeps_columns() {
        let mut output = Vec::new();
        write_fields(&sample_fields(), OutputFormat::Csv, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "section,label,value,unit");
        assert_eq!(lines[1], "short_circuit,Line current,606.33,A");
        assert_eq!(lines[2], "ct_check,Sequence ok,yes,");
    }

    #[test]
    fn test_write_fields_table() {
        let mut output = Vec::new();
        write_fields(&sample_fields(), OutputFormat::Table, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert!(result.starts_with("QUANTITY"));
        assert!(result.contains("606.33"));
        assert!(result.contains("yes"));
    }
}
