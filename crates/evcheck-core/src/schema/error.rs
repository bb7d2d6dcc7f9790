//! Schema error types
//!
//! These are faults in the validator's own inputs (a malformed schema or data
//! document, an uncompilable pattern). They are reported to the caller
//! separately from the per-field error entries a walk produces.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for schema parsing and validator entry points
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Caller-visible faults in schema or data documents
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema, nested schema, or data document was not a JSON object
    #[error("{what} must be a JSON object, found {found}")]
    NotAnObject { what: String, found: String },

    /// A document was not well-formed JSON
    #[error("Malformed {what}: {source}")]
    Malformed {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A rule entry could not be interpreted
    #[error("Invalid rule for field '{path}': {reason}")]
    InvalidRule { path: String, reason: String },

    /// The `type` attribute was not a string
    #[error("Invalid type declaration for field '{path}': {found}")]
    InvalidType { path: String, found: String },

    /// The `length` attribute has no integer value
    #[error("Invalid length for field '{path}': '{value}' is not an integer")]
    InvalidLength { path: String, value: String },

    /// The `regex` attribute failed to compile
    #[error("Invalid regex for field '{path}': '{pattern}': {source}")]
    InvalidRegex {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl SchemaError {
    /// Create a not-an-object error for the given document role
    pub fn not_an_object<W: Into<String>>(what: W, found: &serde_json::Value) -> Self {
        Self::NotAnObject {
            what: what.into(),
            found: crate::coerce::runtime_category(found).to_string(),
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule<P, R>(path: P, reason: R) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        Self::InvalidRule {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Field path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotAnObject { .. } | Self::Malformed { .. } => None,
            Self::InvalidRule { path, .. }
            | Self::InvalidType { path, .. }
            | Self::InvalidLength { path, .. }
            | Self::InvalidRegex { path, .. } => Some(path),
        }
    }
}
