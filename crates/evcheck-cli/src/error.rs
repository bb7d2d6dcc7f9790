//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Schema or data document fault reported by the validator
    #[error("Schema error: {0}")]
    Schema(#[from] evcheck_core::SchemaError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No stored schema for an event name
    #[error("No schema found for event '{}' in {}", event_name, dir.display())]
    SchemaNotFound { event_name: String, dir: PathBuf },

    /// Event name could not be extracted from a payload
    #[error("No event name at '{}' in {}", path, file.display())]
    EventNameMissing { path: String, file: PathBuf },

    /// Schema store failure with context
    #[error("Schema store error: {0:#}")]
    Store(#[from] anyhow::Error),

    /// A line of an outcome record file could not be read
    #[error("Malformed record at {}:{}: {}", path.display(), line, message)]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// One or more inputs had error entries or could not be checked
    #[error("Validation failed: {failed} of {total} input(s) had errors")]
    ValidationFailed { failed: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::ValidationFailed { .. } => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::Schema(_) => 6,
            Self::SchemaNotFound { .. } => 7,
            Self::EventNameMissing { .. } => 8,
            Self::Store(_) => 9,
            Self::MalformedRecord { .. } => 10,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
