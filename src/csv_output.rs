//! CSV summary rows for comparing stacks across runs
//!
//! The sink is append-only: an optional header `name,<names...>` followed by
//! one row per computed stack, the row's label then one `%f` field per name.

use crate::pipeline::StackReport;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Append-only CSV writer
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the header row
    pub fn write_header(&mut self, names: &[String]) -> io::Result<()> {
        self.out.write_all(b"name")?;
        for name in names {
            write!(self.out, ",{}", escape_field(name))?;
        }
        self.out.write_all(b"\n")
    }

    /// Write one data row
    pub fn write_row(&mut self, label: &str, values: &[f64]) -> io::Result<()> {
        self.out.write_all(escape_field(label).as_bytes())?;
        for value in values {
            write!(self.out, ",{:.6}", value)?;
        }
        self.out.write_all(b"\n")
    }

    /// Header (when requested) then the summary row of `report`
    pub fn write_report(
        &mut self,
        report: &StackReport,
        label: &str,
        header: bool,
    ) -> io::Result<()> {
        if header {
            self.write_header(&report.names)?;
        }
        self.write_row(label, &report.summary_row())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Append the summary row of `report` to the CSV file at `path`
pub fn append_report<P: AsRef<Path>>(
    path: P,
    report: &StackReport,
    label: &str,
    header: bool,
) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open CSV output: {}", path.display()))?;
    CsvSink::new(io::BufWriter::new(file))
        .write_report(report, label, header)
        .with_context(|| format!("Failed to write CSV output: {}", path.display()))
}
