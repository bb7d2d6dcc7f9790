//! Rule evaluation for a single field
//!
//! Each [`Constraint`] kind has its own check. Checks never short-circuit
//! each other: a rule with four constraints always yields four verdicts.
//! A passing `array`/`object` type check descends into the rule's nested
//! schema before the remaining constraints run.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

use crate::coerce;
use crate::schema::{
    Constraint, FieldType, LengthConstraint, MatchMode, PatternConstraint, Rule, ValueConstraint,
};
use crate::validation::base::WalkContext;
use crate::validation::outcome::{ErrorEntry, ErrorKind, OutcomeCollector, ValidEntry, Verdict};
use crate::validation::walker;

/// Evaluate every constraint on `rule` against a present `actual` value
///
/// Constraints run in declaration order and each verdict is recorded in
/// `collector` under `context.path`. Outcomes of a nested schema are recorded
/// right after the container type check that enabled them.
pub fn evaluate(
    rule: &Rule,
    actual: &Value,
    context: &WalkContext<'_>,
    collector: &mut OutcomeCollector,
) {
    for constraint in &rule.constraints {
        let verdict = check(constraint, rule, &context.path, actual);
        let descend = verdict.is_pass()
            && matches!(constraint, Constraint::Type(field_type) if field_type.is_container());

        collector.record_verdict(verdict);

        if descend {
            if let Some(nested) = rule.nested_schema() {
                walker::descend_into(nested, actual, context, collector);
            }
        }
    }
}

/// Run one constraint
pub fn check(constraint: &Constraint, rule: &Rule, field: &str, actual: &Value) -> Verdict {
    match constraint {
        Constraint::Value(expected) => check_value(expected, field, actual),
        Constraint::Type(field_type) => check_type(field_type, rule.optional, field, actual),
        Constraint::Length(length) => check_length(length, field, actual),
        Constraint::Pattern(pattern) => check_pattern(pattern, field, actual),
    }
}

/// Compare string forms, exactly or by containment
pub fn check_value(constraint: &ValueConstraint, field: &str, actual: &Value) -> Verdict {
    let expected = coerce::value_to_string(&constraint.expected);
    let actual_str = coerce::value_to_string(actual);

    match constraint.mode {
        MatchMode::Exact if actual_str != expected => Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::ValueMismatch,
            expected,
            actual_str,
        )),
        MatchMode::Contains if !coerce::is_truthy(actual) || !actual_str.contains(&expected) => {
            Verdict::Fail(ErrorEntry::new(
                field,
                ErrorKind::ValueNotContained,
                format!("value containing '{}'", expected),
                actual_str,
            ))
        }
        _ => Verdict::pass(),
    }
}

/// Check the declared type; a pass records a valid entry
pub fn check_type(field_type: &FieldType, optional: bool, field: &str, actual: &Value) -> Verdict {
    let conforms = match field_type {
        FieldType::String => match actual {
            Value::String(s) if s.trim().is_empty() && !optional => {
                return Verdict::Fail(ErrorEntry::new(
                    field,
                    ErrorKind::EmptyString,
                    "non-empty string",
                    "empty string",
                ));
            }
            Value::String(_) => true,
            _ => false,
        },
        FieldType::Array => actual.is_array(),
        FieldType::Object => actual.is_object(),
        FieldType::Number | FieldType::Boolean | FieldType::Other(_) => {
            coerce::runtime_category(actual) == field_type.as_str()
        }
    };

    if conforms {
        Verdict::Pass(Some(ValidEntry::new(field, field_type.as_str(), actual.clone())))
    } else {
        Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::TypeMismatch,
            field_type.as_str(),
            describe_shape(actual),
        ))
    }
}

/// Exact length of a string or array
pub fn check_length(constraint: &LengthConstraint, field: &str, actual: &Value) -> Verdict {
    match coerce::measured_length(actual) {
        Some(length) if length as i64 == constraint.expected => Verdict::pass(),
        Some(length) => Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::LengthMismatch,
            constraint.expected.to_string(),
            length.to_string(),
        )),
        None => Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::IncompatibleShape,
            format!("string or array of length {}", constraint.expected),
            describe_shape(actual),
        )),
    }
}

/// Unanchored pattern match against the string form
pub fn check_pattern(constraint: &PatternConstraint, field: &str, actual: &Value) -> Verdict {
    let expected = format!("match for /{}/", constraint.pattern);

    if coerce::is_blank(actual) {
        return Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::RegexMismatch,
            expected,
            "empty value",
        ));
    }

    if actual.is_array() || actual.is_object() {
        return Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::IncompatibleShape,
            expected,
            describe_shape(actual),
        ));
    }

    let actual_str = coerce::value_to_string(actual);
    if constraint.regex.is_match(&actual_str) {
        Verdict::pass()
    } else {
        Verdict::Fail(ErrorEntry::new(
            field,
            ErrorKind::RegexMismatch,
            expected,
            actual_str,
        ))
    }
}

/// Category used in error descriptors; unlike the runtime category, `null`
/// is reported as itself
fn describe_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        other => coerce::runtime_category(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::validation::base::EventIdentity;
    use serde_json::json;

    fn rule(definition: Value) -> Rule {
        Schema::from_value(&json!({ "field": definition }))
            .unwrap()
            .rules()[0]
            .clone()
    }

    fn verdicts(rule: &Rule, actual: &Value) -> Vec<Verdict> {
        rule.constraints
            .iter()
            .map(|constraint| check(constraint, rule, "field", actual))
            .collect()
    }

    fn failures(verdicts: &[Verdict]) -> Vec<ErrorKind> {
        verdicts
            .iter()
            .filter_map(|v| match v {
                Verdict::Fail(e) => Some(e.kind),
                Verdict::Pass(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_exact_value_compares_string_forms() {
        let r = rule(json!({"value": 5}));
        assert!(verdicts(&r, &json!("5"))[0].is_pass());
        assert!(verdicts(&r, &json!(5.0))[0].is_pass());
        assert_eq!(failures(&verdicts(&r, &json!(6))), [ErrorKind::ValueMismatch]);
    }

    #[test]
    fn test_null_value_constraint() {
        let r = rule(json!({"value": null}));
        assert!(verdicts(&r, &json!(null))[0].is_pass());
        assert!(verdicts(&r, &json!("null"))[0].is_pass());
        assert!(!verdicts(&r, &json!(""))[0].is_pass());
    }

    #[test]
    fn test_contains_value() {
        let r = rule(json!({"value": "elect"}));
        let mut contains = r.clone();
        if let Constraint::Value(v) = &mut contains.constraints[0] {
            v.mode = MatchMode::Contains;
        }

        assert!(verdicts(&contains, &json!("electronics"))[0].is_pass());
        assert_eq!(
            failures(&verdicts(&r, &json!("electronics"))),
            [ErrorKind::ValueMismatch]
        );
        assert_eq!(
            failures(&verdicts(&contains, &json!(0))),
            [ErrorKind::ValueNotContained]
        );
    }

    #[test]
    fn test_string_type() {
        let r = rule(json!({"type": "string"}));
        match &verdicts(&r, &json!("abc"))[0] {
            Verdict::Pass(Some(valid)) => {
                assert_eq!(valid.field_type, "string");
                assert_eq!(valid.value, json!("abc"));
            }
            other => panic!("unexpected verdict {:?}", other),
        }
        assert_eq!(failures(&verdicts(&r, &json!("  "))), [ErrorKind::EmptyString]);
        assert_eq!(failures(&verdicts(&r, &json!(3))), [ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_optional_blank_string_passes_type() {
        let r = rule(json!({"type": "string", "optional": true}));
        assert!(verdicts(&r, &json!(""))[0].is_pass());
    }

    #[test]
    fn test_container_and_primitive_types() {
        assert!(verdicts(&rule(json!({"type": "array"})), &json!([]))[0].is_pass());
        assert!(verdicts(&rule(json!({"type": "object"})), &json!({}))[0].is_pass());
        assert!(verdicts(&rule(json!({"type": "number"})), &json!(1.5))[0].is_pass());
        assert!(verdicts(&rule(json!({"type": "boolean"})), &json!(false))[0].is_pass());

        match &verdicts(&rule(json!({"type": "object"})), &json!(null))[0] {
            Verdict::Fail(e) => {
                assert_eq!(e.kind, ErrorKind::TypeMismatch);
                assert_eq!(e.actual, "null");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
        assert!(!verdicts(&rule(json!({"type": "object"})), &json!([]))[0].is_pass());
        assert!(!verdicts(&rule(json!({"type": "number"})), &json!("1"))[0].is_pass());
    }

    #[test]
    fn test_other_type_uses_runtime_category() {
        let r = rule(json!({"type": "integer"}));
        match &verdicts(&r, &json!(1))[0] {
            Verdict::Fail(e) => {
                assert_eq!(e.expected, "integer");
                assert_eq!(e.actual, "number");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_length_is_exact() {
        let r = rule(json!({"length": 5}));
        assert!(verdicts(&r, &json!("abcde"))[0].is_pass());
        assert!(verdicts(&r, &json!([1, 2, 3, 4, 5]))[0].is_pass());

        match &verdicts(&r, &json!("abcdef"))[0] {
            Verdict::Fail(e) => {
                assert_eq!(e.kind, ErrorKind::LengthMismatch);
                assert_eq!(e.expected, "5");
                assert_eq!(e.actual, "6");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
        assert_eq!(failures(&verdicts(&r, &json!("abcd"))), [ErrorKind::LengthMismatch]);
        assert_eq!(failures(&verdicts(&r, &json!(12345))), [ErrorKind::IncompatibleShape]);
    }

    #[test]
    fn test_length_of_null_is_zero() {
        assert!(verdicts(&rule(json!({"length": 0})), &json!(null))[0].is_pass());
    }

    #[test]
    fn test_regex_is_unanchored() {
        let r = rule(json!({"regex": "\\d+"}));
        assert!(verdicts(&r, &json!("abc123xyz"))[0].is_pass());
        assert!(verdicts(&r, &json!(42))[0].is_pass());
        assert_eq!(failures(&verdicts(&r, &json!("abc"))), [ErrorKind::RegexMismatch]);

        let anchored = rule(json!({"regex": "^\\d+$"}));
        assert!(!verdicts(&anchored, &json!("abc123xyz"))[0].is_pass());
    }

    #[test]
    fn test_regex_never_matches_blank() {
        let r = rule(json!({"regex": ".*"}));
        assert_eq!(failures(&verdicts(&r, &json!("   "))), [ErrorKind::RegexMismatch]);
        assert_eq!(failures(&verdicts(&r, &json!(null))), [ErrorKind::RegexMismatch]);
        assert_eq!(failures(&verdicts(&r, &json!(["a"]))), [ErrorKind::IncompatibleShape]);
    }

    #[test]
    fn test_all_constraints_evaluated() {
        let r = rule(json!({"value": "x", "type": "string", "length": 2, "regex": "^y"}));
        let all = verdicts(&r, &json!(7));
        assert_eq!(all.len(), 4);
        assert_eq!(
            failures(&all),
            [
                ErrorKind::ValueMismatch,
                ErrorKind::TypeMismatch,
                ErrorKind::IncompatibleShape,
                ErrorKind::RegexMismatch,
            ]
        );
    }

    #[test]
    fn test_evaluate_records_nested_outcomes() {
        let r = rule(json!({"type": "array", "nestedSchema": {"id": {"type": "string"}}}));
        let identity = EventIdentity::new("cart", "evt-1");
        let context = WalkContext::new(&identity).child("items");
        let mut collector = OutcomeCollector::new();

        evaluate(&r, &json!([{"id": 7}, {"id": "ok"}]), &context, &mut collector);

        let errors: Vec<_> = collector.errors().iter().map(|e| (e.field.as_str(), e.kind)).collect();
        assert_eq!(errors, [("items[0].id", ErrorKind::TypeMismatch)]);
        let valid: Vec<_> = collector.valid_entries().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(valid, ["items", "items[1].id"]);
    }

    #[test]
    fn test_evaluate_skips_nested_after_failed_type() {
        let r = rule(json!({"type": "object", "nestedSchema": {"id": {"type": "string"}}}));
        let identity = EventIdentity::new("cart", "evt-1");
        let context = WalkContext::new(&identity).child("meta");
        let mut collector = OutcomeCollector::new();

        evaluate(&r, &json!([{"id": 7}]), &context, &mut collector);

        assert_eq!(collector.errors().len(), 1);
        assert_eq!(collector.errors()[0].field, "meta");
        assert_eq!(collector.errors()[0].kind, ErrorKind::TypeMismatch);
    }
}
