//! Event validation
//!
//! Three cooperating pieces, leaf first:
//!
//! - `evaluator`: runs one rule's constraints against one value
//! - `walker`: recursive descent over schema and data with path tracking
//! - `outcome`: the call-scoped collector and the final report
//!
//! [`EventValidator`] ties them together. Each call owns a fresh collector,
//! so one validator can serve concurrent calls from several threads.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod evaluator;
pub mod outcome;
pub mod walker;

pub use base::{EventIdentity, WalkContext};
pub use outcome::{
    ErrorEntry, ErrorKind, Outcome, OutcomeCollector, Summary, ValidEntry, ValidationReport,
    Verdict,
};
pub use walker::walk;

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::schema::{Schema, SchemaError, SchemaResult};

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Keep valid-field records alongside errors
    pub collect_valid: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            collect_valid: true,
        }
    }
}

impl ValidationConfig {
    /// Report errors only
    pub fn errors_only() -> Self {
        Self {
            collect_valid: false,
        }
    }
}

/// Validator for one parsed schema
///
/// The schema is held behind an [`Arc`], so validators built from a cached
/// `Arc<Schema>` share its rule tree instead of copying it.
///
/// # Examples
///
/// ```rust
/// use evcheck_core::{EventIdentity, EventValidator, Schema};
/// use serde_json::json;
///
/// let schema = Schema::from_value(&json!({
///     "event_name": {"type": "string", "value": "purchase"},
///     "amount": {"type": "number", "optional": true}
/// })).unwrap();
///
/// let validator = EventValidator::new(schema);
/// let report = validator
///     .validate(&json!({"event_name": "purchase"}), &EventIdentity::new("purchase", "evt-1"))
///     .unwrap();
///
/// assert!(report.is_valid());
/// assert_eq!(report.summary.valid_count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct EventValidator {
    schema: Arc<Schema>,
    config: ValidationConfig,
}

impl EventValidator {
    /// Create a validator with default configuration
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self::with_config(schema, ValidationConfig::default())
    }

    pub fn with_config(schema: impl Into<Arc<Schema>>, config: ValidationConfig) -> Self {
        Self {
            schema: schema.into(),
            config,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate one data document
    ///
    /// Field failures are reported in the returned report; only a data
    /// document that is not a JSON object is an error.
    #[instrument(
        skip(self, data, identity),
        fields(event_name = %identity.event_name, event_id = %identity.event_id)
    )]
    pub fn validate(&self, data: &Value, identity: &EventIdentity) -> SchemaResult<ValidationReport> {
        let fields = data
            .as_object()
            .ok_or_else(|| SchemaError::not_an_object("data document", data))?;

        let context = WalkContext::new(identity);
        let mut collector = OutcomeCollector::with_valid_entries(self.config.collect_valid);
        walk(&self.schema, fields, &context, &mut collector);

        let report = collector.into_report(identity);
        debug!(
            errors = report.summary.error_count,
            valid = report.summary.valid_count,
            "validation finished"
        );
        Ok(report)
    }

    /// Validate several documents, one independent call each
    pub fn validate_batch(
        &self,
        documents: &[(Value, EventIdentity)],
    ) -> Vec<SchemaResult<ValidationReport>> {
        documents
            .iter()
            .map(|(data, identity)| self.validate(data, identity))
            .collect()
    }
}

/// Parse a schema document and validate one data document against it
pub fn validate_document(
    schema: &Value,
    data: &Value,
    identity: &EventIdentity,
) -> SchemaResult<ValidationReport> {
    EventValidator::new(Schema::from_value(schema)?).validate(data, identity)
}
