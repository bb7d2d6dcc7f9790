//! Lint command handler

use super::utils::load_schema;
use crate::cli::{LintArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::PathBuf;

/// Lint result for one schema file
#[derive(Debug, Serialize)]
pub struct LintOutcome {
    pub file: PathBuf,
    pub ok: bool,
    /// Number of top-level rules when the schema parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<usize>,
    /// Field path the fault was found at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse one schema file without validating any data
pub fn lint_file(file: PathBuf) -> LintOutcome {
    match load_schema(&file) {
        Ok(schema) => LintOutcome {
            file,
            ok: true,
            rules: Some(schema.len()),
            path: None,
            error: None,
        },
        Err(e) => {
            let path = match &e {
                Error::Schema(schema_error) => schema_error.path().map(str::to_string),
                _ => None,
            };
            LintOutcome {
                file,
                ok: false,
                rules: None,
                path,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Handle the lint command
pub fn handle_lint(args: LintArgs, output: &mut OutputWriter) -> Result<()> {
    let total = args.schemas.len();
    let outcomes: Vec<LintOutcome> = args.schemas.into_iter().map(lint_file).collect();
    let failed = outcomes.iter().filter(|o| !o.ok).count();

    if output.format() == OutputFormat::Human {
        for outcome in &outcomes {
            match (&outcome.error, outcome.rules) {
                (Some(error), _) => output.error(&format!("✗ {}: {}", outcome.file.display(), error))?,
                (None, rules) => output.success(&format!(
                    "✓ {}: {} rule(s)",
                    outcome.file.display(),
                    rules.unwrap_or(0)
                ))?,
            }
        }
    } else {
        output.data(&outcomes)?;
    }

    if failed > 0 {
        return Err(Error::ValidationFailed { failed, total });
    }
    Ok(())
}
