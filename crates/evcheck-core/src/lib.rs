//! evcheck core - declarative JSON event validation
//!
//! This crate validates event payloads against declarative schema documents
//! and reports a per-field outcome list rather than a single pass/fail flag.
//!
//! ## Features
//!
//! - **Recursive Validation**: nested schemas for array items and objects,
//!   with dotted/bracketed field paths (`items[2].sku`)
//! - **Independent Constraints**: `value`, `type`, `length` and `regex` are
//!   all evaluated on every present field, in that order
//! - **Optional Fields**: missing, null or blank optional fields produce no
//!   outcome at all
//! - **Contains Matching**: a `*`-prefixed rule key matches by substring
//! - **Call-Scoped Results**: every call owns its collector, so validators
//!   are safe to share across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use evcheck_core::{validate_document, EventIdentity, ErrorKind};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "items": {"type": "array", "nestedSchema": {"id": {"type": "string"}}}
//! });
//! let data = json!({"items": [{"id": "a"}, {"id": 7}]});
//!
//! let report = validate_document(&schema, &data, &EventIdentity::new("cart", "evt-42")).unwrap();
//! assert_eq!(report.errors.len(), 1);
//! assert_eq!(report.errors[0].field, "items[1].id");
//! assert_eq!(report.errors[0].kind, ErrorKind::TypeMismatch);
//! ```
//!
//! ## Errors
//!
//! Field failures are data: they appear as error entries in the report.
//! [`SchemaError`] is reserved for faults in the inputs themselves (a schema
//! or data document that is not an object, an invalid rule, a pattern that
//! does not compile).
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod coerce;
pub mod schema;
pub mod validation;

// Re-export commonly used types for convenience
pub use schema::{
    Constraint, FieldType, LengthConstraint, MatchMode, PatternConstraint, Rule, Schema,
    SchemaError, SchemaResult, ValueConstraint,
};
pub use validation::{
    validate_document, walk, ErrorEntry, ErrorKind, EventIdentity, EventValidator, Outcome,
    OutcomeCollector, Summary, ValidEntry, ValidationConfig, ValidationReport, Verdict,
    WalkContext,
};
