//! Per-field outcomes and the call-scoped collector
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::validation::base::EventIdentity;

/// Category of a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field absent from the data document
    Missing,
    /// Actual value's category differs from the declared type
    TypeMismatch,
    /// Required string is empty or whitespace
    EmptyString,
    /// Exact value match failed
    ValueMismatch,
    /// Contains-mode value match failed
    ValueNotContained,
    /// Actual length differs from the declared length
    LengthMismatch,
    /// Pattern did not match, or the value was blank
    RegexMismatch,
    /// Check cannot apply to the actual value's shape
    IncompatibleShape,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::TypeMismatch => "type_mismatch",
            Self::EmptyString => "empty_string",
            Self::ValueMismatch => "value_mismatch",
            Self::ValueNotContained => "value_not_contained",
            Self::LengthMismatch => "length_mismatch",
            Self::RegexMismatch => "regex_mismatch",
            Self::IncompatibleShape => "incompatible_shape",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that failed one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Dotted/bracketed field path
    pub field: String,
    #[serde(rename = "error_type")]
    pub kind: ErrorKind,
    pub expected: String,
    pub actual: String,
}

impl ErrorEntry {
    pub fn new<F, E, A>(field: F, kind: ErrorKind, expected: E, actual: A) -> Self
    where
        F: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self {
            field: field.into(),
            kind,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Entry for a required field absent from the data
    pub fn missing<F: Into<String>>(field: F) -> Self {
        Self::new(field, ErrorKind::Missing, "field present", "field missing")
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at '{}': expected {}, but found {}",
            self.kind, self.field, self.expected, self.actual
        )
    }
}

/// A field whose declared type matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidEntry {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: Value,
}

impl ValidEntry {
    pub fn new<F, T>(field: F, field_type: T, value: Value) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self {
            field: field.into(),
            field_type: field_type.into(),
            value,
        }
    }
}

/// Something worth recording from one check
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Error(ErrorEntry),
    Valid(ValidEntry),
}

/// Result of running one constraint against one value
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Check passed, optionally producing a valid-field record
    Pass(Option<ValidEntry>),
    Fail(ErrorEntry),
}

impl Verdict {
    pub fn pass() -> Self {
        Self::Pass(None)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    pub fn into_outcome(self) -> Option<Outcome> {
        match self {
            Self::Pass(valid) => valid.map(Outcome::Valid),
            Self::Fail(error) => Some(Outcome::Error(error)),
        }
    }
}

/// Derived counts for a finished walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub error_count: usize,
    pub valid_count: usize,
}

/// Ordered outcomes of one validation call
///
/// One collector belongs to exactly one call. It is passed by `&mut` through
/// the recursion and turned into a [`ValidationReport`] at the end.
#[derive(Debug, Clone)]
pub struct OutcomeCollector {
    errors: Vec<ErrorEntry>,
    valid: Vec<ValidEntry>,
    collect_valid: bool,
}

impl OutcomeCollector {
    /// Create a collector that keeps both errors and valid entries
    pub fn new() -> Self {
        Self::with_valid_entries(true)
    }

    /// Create a collector, optionally discarding valid entries
    pub fn with_valid_entries(collect_valid: bool) -> Self {
        Self {
            errors: Vec::new(),
            valid: Vec::new(),
            collect_valid,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Error(error) => self.errors.push(error),
            Outcome::Valid(valid) if self.collect_valid => self.valid.push(valid),
            Outcome::Valid(_) => {}
        }
    }

    /// Record whatever a verdict produced
    pub fn record_verdict(&mut self, verdict: Verdict) {
        if let Some(outcome) = verdict.into_outcome() {
            self.record(outcome);
        }
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn valid_entries(&self) -> &[ValidEntry] {
        &self.valid
    }

    pub fn summary(&self) -> Summary {
        Summary {
            error_count: self.errors.len(),
            valid_count: self.valid.len(),
        }
    }

    /// Drop all recorded outcomes
    pub fn reset(&mut self) {
        self.errors.clear();
        self.valid.clear();
    }

    /// Finish the call and attach its identity
    pub fn into_report(self, identity: &EventIdentity) -> ValidationReport {
        let summary = self.summary();
        ValidationReport {
            event_name: identity.event_name.clone(),
            event_id: identity.event_id.clone(),
            errors: self.errors,
            valid: self.valid,
            summary,
        }
    }
}

impl Default for OutcomeCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub event_name: String,
    pub event_id: String,
    #[serde(rename = "error_entries")]
    pub errors: Vec<ErrorEntry>,
    #[serde(rename = "valid_entries")]
    pub valid: Vec<ValidEntry>,
    pub summary: Summary,
}

impl ValidationReport {
    /// No error entries were produced
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error entries recorded for a given field path
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ErrorEntry> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event '{}' ({}): {} error(s), {} valid field(s)",
            self.event_name, self.event_id, self.summary.error_count, self.summary.valid_count
        )?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}
