//! Recursive schema walker
//!
//! Walks a schema level against a data object, applies required/optional
//! semantics, runs each present field's constraints through the evaluator and
//! descends into nested schemas for arrays and objects. Every outcome goes
//! into the caller's [`OutcomeCollector`]; nothing is shared between calls.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::coerce;
use crate::schema::Schema;
use crate::validation::base::WalkContext;
use crate::validation::evaluator;
use crate::validation::outcome::{ErrorEntry, Outcome, OutcomeCollector};

/// Walk one schema level against one data object
///
/// Fields are visited in schema declaration order and outcomes are recorded
/// depth-first, so the collector's order is deterministic for a given
/// schema/data pair.
pub fn walk(
    schema: &Schema,
    data: &Map<String, Value>,
    context: &WalkContext<'_>,
    collector: &mut OutcomeCollector,
) {
    for rule in schema.rules() {
        let field_context = context.child(&rule.name);

        match data.get(&rule.name) {
            None if rule.optional => {
                trace!(field = %field_context.path, "optional field absent, skipping");
            }
            None => {
                debug!(
                    field = %field_context.path,
                    event_name = %context.identity.event_name,
                    event_id = %context.identity.event_id,
                    "required field missing"
                );
                collector.record(Outcome::Error(ErrorEntry::missing(&field_context.path)));
            }
            Some(actual) if rule.optional && coerce::is_blank(actual) => {
                trace!(field = %field_context.path, "optional field blank, skipping");
            }
            Some(actual) => evaluator::evaluate(rule, actual, &field_context, collector),
        }
    }
}

/// Walk a nested schema under a container value that passed its type check
///
/// Array items are walked one by one with an index in the path; primitive
/// items are wrapped under the nested schema's first field name.
pub(crate) fn descend_into(
    nested: &Schema,
    actual: &Value,
    context: &WalkContext<'_>,
    collector: &mut OutcomeCollector,
) {
    match actual {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item_context = context.child_index(index);
                match item {
                    Value::Object(fields) => walk(nested, fields, &item_context, collector),
                    primitive => match wrap_primitive(nested, primitive) {
                        Some(pseudo) => walk(nested, &pseudo, &item_context, collector),
                        None => {
                            trace!(field = %item_context.path, "empty nested schema");
                        }
                    },
                }
            }
        }
        Value::Object(fields) => walk(nested, fields, context, collector),
        _ => {}
    }
}

/// Wrap a primitive array item as a one-field document keyed by the nested
/// schema's first field
fn wrap_primitive(nested: &Schema, item: &Value) -> Option<Map<String, Value>> {
    let key = nested.rules().first()?.name.clone();
    let mut pseudo = Map::new();
    pseudo.insert(key, item.clone());
    Some(pseudo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::base::EventIdentity;
    use crate::validation::outcome::ErrorKind;
    use serde_json::json;

    fn run(schema: Value, data: Value) -> OutcomeCollector {
        let schema = Schema::from_value(&schema).unwrap();
        let identity = EventIdentity::new("test_event", "evt-1");
        let context = WalkContext::new(&identity);
        let mut collector = OutcomeCollector::new();
        walk(&schema, data.as_object().unwrap(), &context, &mut collector);
        collector
    }

    fn error_paths(collector: &OutcomeCollector) -> Vec<(String, ErrorKind)> {
        collector
            .errors()
            .iter()
            .map(|e| (e.field.clone(), e.kind))
            .collect()
    }

    #[test]
    fn test_missing_required_field() {
        let collector = run(json!({"user_id": {"type": "string"}}), json!({}));
        assert_eq!(error_paths(&collector), [("user_id".to_string(), ErrorKind::Missing)]);
        assert!(collector.valid_entries().is_empty());
    }

    #[test]
    fn test_optional_absent_null_and_blank_are_skipped() {
        let schema = json!({"note": {"type": "string", "regex": "x", "optional": true}});
        for data in [json!({}), json!({"note": null}), json!({"note": "  "})] {
            let collector = run(schema.clone(), data);
            assert!(collector.errors().is_empty());
            assert!(collector.valid_entries().is_empty());
        }
    }

    #[test]
    fn test_nested_array_paths() {
        let collector = run(
            json!({"items": {"type": "array", "nestedSchema": {"id": {"type": "string"}}}}),
            json!({"items": [{"id": "a"}, {"id": 7}]}),
        );

        assert_eq!(
            error_paths(&collector),
            [("items[1].id".to_string(), ErrorKind::TypeMismatch)]
        );
        let valid: Vec<_> = collector.valid_entries().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(valid, ["items", "items[0].id"]);
    }

    #[test]
    fn test_nested_object_keeps_path() {
        let collector = run(
            json!({"user": {"type": "object", "nestedSchema": {
                "name": {"type": "string"},
                "address": {"type": "object", "nestedSchema": {"zip": {"length": 5}}}
            }}}),
            json!({"user": {"name": "", "address": {"zip": "1234"}}}),
        );

        assert_eq!(
            error_paths(&collector),
            [
                ("user.name".to_string(), ErrorKind::EmptyString),
                ("user.address.zip".to_string(), ErrorKind::LengthMismatch),
            ]
        );
    }

    #[test]
    fn test_primitive_items_are_wrapped() {
        let collector = run(
            json!({"tags": {"type": "array", "nestedSchema": {"tag": {"type": "string", "regex": "^[a-z]+$"}}}}),
            json!({"tags": ["alpha", "Beta", 3]}),
        );

        assert_eq!(
            error_paths(&collector),
            [
                ("tags[1].tag".to_string(), ErrorKind::RegexMismatch),
                ("tags[2].tag".to_string(), ErrorKind::TypeMismatch),
                ("tags[2].tag".to_string(), ErrorKind::RegexMismatch),
            ]
        );
    }

    #[test]
    fn test_container_without_nested_schema_is_shallow() {
        let collector = run(
            json!({"payload": {"type": "object"}, "list": {"type": "array"}}),
            json!({"payload": {"anything": [1, 2]}, "list": [null, {}]}),
        );
        assert!(collector.errors().is_empty());
        assert_eq!(collector.valid_entries().len(), 2);
    }

    #[test]
    fn test_type_mismatch_does_not_stop_other_checks() {
        let collector = run(
            json!({"items": {"type": "array", "length": 2, "regex": "x", "nestedSchema": {"id": {"type": "string"}}}}),
            json!({"items": "xy"}),
        );

        // regex passes on the string form; nested schema is not applied
        assert_eq!(
            error_paths(&collector),
            [("items".to_string(), ErrorKind::TypeMismatch)]
        );
    }

    #[test]
    fn test_nested_outcomes_precede_later_checks_of_parent() {
        let collector = run(
            json!({"items": {"type": "array", "length": 3, "nestedSchema": {"id": {"type": "number"}}}}),
            json!({"items": [{"id": "a"}]}),
        );

        assert_eq!(
            error_paths(&collector),
            [
                ("items[0].id".to_string(), ErrorKind::TypeMismatch),
                ("items".to_string(), ErrorKind::LengthMismatch),
            ]
        );
    }
}
