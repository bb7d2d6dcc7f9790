//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod check;
mod completions;
mod lint;
mod report;
pub mod utils;
mod validate;

pub use check::handle_check;
pub use completions::handle_completions;
pub use lint::handle_lint;
pub use report::handle_report;
pub use validate::handle_validate;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::records::RecordSink;
use evcheck_core::ValidationReport;
use std::path::PathBuf;

/// Build the record sink from the config, with an optional command-line override
fn record_sink(config: &Config, file_override: Option<PathBuf>) -> Option<RecordSink> {
    file_override
        .or_else(|| config.records.file.clone())
        .map(|path| RecordSink::new(path, config.records.include_valid))
}

/// Write reports to the record sink and turn failures into the final result
fn finish(
    reports: &[ValidationReport],
    failed: usize,
    total: usize,
    sink: Option<&RecordSink>,
    output: &mut OutputWriter,
) -> Result<()> {
    if let Some(sink) = sink {
        let written = sink.append(reports)?;
        if written > 0 {
            output.info(&format!(
                "Appended {} record(s) to {}",
                written,
                sink.path().display()
            ))?;
        }
    }

    if failed > 0 {
        return Err(Error::ValidationFailed { failed, total });
    }

    output.success(&format!("✅ All {} input(s) passed", total))?;
    Ok(())
}
