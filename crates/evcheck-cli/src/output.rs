//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! rendering for validation reports.
//!
//! Several structured values written by one command form a stream: YAML
//! documents are separated by `---`, JSON values follow each other on
//! their own lines.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use evcheck_core::{ErrorEntry, ValidEntry, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting output with specialized support for reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report, hiding valid entries unless asked
    fn format_report(&self, report: &ValidationReport, show_valid: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_report(&self, report: &ValidationReport, show_valid: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report, show_valid)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
    documents: usize,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
            documents: 0,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Start a structured document, separating it from the previous one
    fn begin_document(&mut self) -> Result<()> {
        if self.format == OutputFormat::Yaml && self.documents > 0 {
            self.writeln("---")?;
        }
        self.documents += 1;
        Ok(())
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.begin_document()?;
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(formatted.trim_end())
    }

    /// Write a validation report
    pub fn report(&mut self, report: &ValidationReport, show_valid: bool) -> Result<()> {
        if self.format == OutputFormat::Human {
            if self.quiet && report.is_valid() {
                return Ok(());
            }
            let headline = report_headline(report);
            match (report.is_valid(), self.use_color) {
                (true, true) => self.writeln(&headline.green().bold().to_string())?,
                (false, true) => self.writeln(&headline.red().bold().to_string())?,
                _ => self.writeln(&headline)?,
            }
        }

        if self.format != OutputFormat::Human {
            self.begin_document()?;
        }
        let formatted = self.format.format_report(report, show_valid)?;
        if !formatted.is_empty() {
            self.writeln(formatted.trim_end())?;
        }
        Ok(())
    }
}

/// One-line summary of a report
fn report_headline(report: &ValidationReport) -> String {
    let marker = if report.is_valid() { "✅" } else { "❌" };
    format!(
        "{} {} ({}) - {} error(s), {} valid field(s)",
        marker,
        report.event_name,
        report.event_id,
        report.summary.error_count,
        report.summary.valid_count
    )
}

/// Format the entries of a report for human reading
fn format_report_human(report: &ValidationReport, show_valid: bool) -> String {
    let mut output = String::new();

    for (i, entry) in report.errors.iter().enumerate() {
        output.push_str(&format!("{}. {}", i + 1, format_error_entry_human(entry)));
    }

    if show_valid && !report.valid.is_empty() {
        output.push_str("Valid fields:\n");
        for entry in &report.valid {
            output.push_str(&format_valid_entry_human(entry));
        }
    }

    output
}

fn format_error_entry_human(entry: &ErrorEntry) -> String {
    format!(
        "📍 {} [{}]\n   Expected: {}\n   Actual:   {}\n",
        entry.field, entry.kind, entry.expected, entry.actual
    )
}

fn format_valid_entry_human(entry: &ValidEntry) -> String {
    format!(
        "  • {} ({}) = {}\n",
        entry.field,
        entry.field_type,
        format_value_compact(&entry.value)
    )
}

/// Format a JSON value in a compact, human-readable way
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() <= 3 {
                format!(
                    "[{}]",
                    arr.iter()
                        .map(format_value_compact)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.len() <= 2 {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_value_compact(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else {
                format!("{{{} fields}}", obj.len())
            }
        }
    }
}
