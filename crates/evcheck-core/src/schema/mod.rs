//! Schema documents and rules
//!
//! A schema is an ordered mapping from field name to [`Rule`]. Each rule is
//! compiled once into an ordered list of [`Constraint`]s (`value`, `type`,
//! `length`, `regex`) so the walker can run every declared check without
//! branching on attribute presence.
//!
//! ## Pattern dialect
//!
//! `regex` patterns are unanchored and compiled with the `regex` crate after
//! one rewrite: `\d`, `\w`, `\b` and their negations keep their ASCII
//! meaning (`"٣"` is not a `\d`), and a `[` inside a character class is a
//! literal. `\s` and `.` stay Unicode-aware. Inside a class, `&&`, `--` and
//! `~~` are set operators. Lookaround and backreferences are not supported
//! and surface as [`SchemaError::InvalidRegex`].
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod error;

pub use error::{SchemaError, SchemaResult};

use crate::coerce;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::fmt;

/// Key skipped at every schema level
pub const VERSION_KEY: &str = "version";

/// Prefix on a rule key that switches `value` to contains mode
pub const CONTAINS_PREFIX: char = '*';

const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// Any other declared name, checked against the runtime category
    Other(String),
}

impl FieldType {
    /// Parse a declared type name; an empty name means untyped
    pub fn parse(name: &str) -> Option<Self> {
        let field_type = match name.trim() {
            "" => return None,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        };
        Some(field_type)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }

    /// Whether a nested schema applies to this type
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a `value` constraint compares against the actual value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// String forms must be equal
    Exact,
    /// Actual string form must contain the expected string form
    Contains,
}

/// Expected literal for a field
#[derive(Debug, Clone, PartialEq)]
pub struct ValueConstraint {
    pub expected: Value,
    pub mode: MatchMode,
}

/// Exact length for a string or array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthConstraint {
    pub expected: i64,
}

/// Unanchored pattern tested against the actual value's string form
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    pub pattern: String,
    pub regex: Regex,
}

/// One declared constraint kind on a rule
#[derive(Debug, Clone)]
pub enum Constraint {
    Value(ValueConstraint),
    Type(FieldType),
    Length(LengthConstraint),
    Pattern(PatternConstraint),
}

impl Constraint {
    /// Short name of the constraint kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Type(_) => "type",
            Self::Length(_) => "length",
            Self::Pattern(_) => "regex",
        }
    }
}

/// Constraints declared for a single field
#[derive(Debug, Clone)]
pub struct Rule {
    /// Field name with any contains prefix removed
    pub name: String,
    /// Missing, null or blank values are skipped entirely
    pub optional: bool,
    pub description: Option<String>,
    /// Declared constraints in evaluation order
    pub constraints: Vec<Constraint>,
    /// Applied to array items or to the object itself
    pub nested: Option<Schema>,
}

impl Rule {
    /// Declared type, if any
    pub fn field_type(&self) -> Option<&FieldType> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Type(t) => Some(t),
            _ => None,
        })
    }

    /// Nested schema when the declared type is a container
    pub fn nested_schema(&self) -> Option<&Schema> {
        match self.field_type() {
            Some(t) if t.is_container() => self.nested.as_ref(),
            _ => None,
        }
    }

    fn from_value(key: &str, value: &Value, parent_path: &str) -> SchemaResult<Self> {
        let (name, mode) = match key.strip_prefix(CONTAINS_PREFIX) {
            Some(stripped) => (stripped, MatchMode::Contains),
            None => (key, MatchMode::Exact),
        };
        let path = join_path(parent_path, name);

        if name.is_empty() {
            return Err(SchemaError::invalid_rule(path, "field name is empty"));
        }

        let attrs = value.as_object().ok_or_else(|| {
            SchemaError::invalid_rule(
                &path,
                format!("rule must be an object, found {}", coerce::runtime_category(value)),
            )
        })?;

        let optional = attrs.get("optional").map(coerce::is_truthy).unwrap_or(false)
            || matches!(attrs.get("required"), Some(Value::Bool(false)));

        let description = attrs
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let mut constraints = Vec::new();

        if let Some(expected) = attrs.get("value") {
            constraints.push(Constraint::Value(ValueConstraint {
                expected: expected.clone(),
                mode,
            }));
        }

        if let Some(declared) = attrs.get("type") {
            let name = declared.as_str().ok_or_else(|| SchemaError::InvalidType {
                path: path.clone(),
                found: coerce::value_to_string(declared),
            })?;
            if let Some(field_type) = FieldType::parse(name) {
                constraints.push(Constraint::Type(field_type));
            }
        }

        if let Some(declared) = attrs.get("length") {
            let expected =
                coerce::parse_leading_int(declared).ok_or_else(|| SchemaError::InvalidLength {
                    path: path.clone(),
                    value: coerce::value_to_string(declared),
                })?;
            constraints.push(Constraint::Length(LengthConstraint { expected }));
        }

        if let Some(declared) = attrs.get("regex") {
            let pattern = declared.as_str().ok_or_else(|| {
                SchemaError::invalid_rule(&path, "regex must be a string")
            })?;
            let regex = RegexBuilder::new(&ascii_shorthands(pattern))
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
                .map_err(|source| SchemaError::InvalidRegex {
                    path: path.clone(),
                    pattern: pattern.to_string(),
                    source,
                })?;
            constraints.push(Constraint::Pattern(PatternConstraint {
                pattern: pattern.to_string(),
                regex,
            }));
        }

        let nested = match attrs.get("nestedSchema") {
            Some(nested) => Some(Schema::parse_at(nested, &path)?),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            optional,
            description,
            constraints,
            nested,
        })
    }
}

/// Ordered field rules for one schema level
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<Rule>,
}

impl Schema {
    /// Parse a schema document
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evcheck_core::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_value(&json!({
    ///     "version": {"type": "number", "value": 2},
    ///     "event_name": {"type": "string", "value": "purchase"},
    ///     "*category": {"value": "elect"}
    /// })).unwrap();
    ///
    /// let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
    /// assert_eq!(names, ["event_name", "category"]);
    /// ```
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        Self::parse_at(value, "")
    }

    /// Parse a schema document from JSON text
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| SchemaError::Malformed {
            what: "schema document".to_string(),
            source,
        })?;
        Self::from_value(&value)
    }

    fn parse_at(value: &Value, path: &str) -> SchemaResult<Self> {
        let fields: &Map<String, Value> = value.as_object().ok_or_else(|| {
            let what = if path.is_empty() {
                "schema document".to_string()
            } else {
                format!("nestedSchema of '{}'", path)
            };
            SchemaError::not_an_object(what, value)
        })?;

        let rules = fields
            .iter()
            .filter(|(key, _)| key.as_str() != VERSION_KEY)
            .map(|(key, rule)| Rule::from_value(key, rule, path))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by (prefix-free) field name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

/// Rewrite `\d`/`\w`/`\b` shorthands to their ASCII forms and escape a
/// `[` that appears inside a class
fn ascii_shorthands(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if in_class => out.push_str("0-9"),
                Some('d') => out.push_str("[0-9]"),
                Some('D') => out.push_str("[^0-9]"),
                Some('w') if in_class => out.push_str("0-9A-Za-z_"),
                Some('w') => out.push_str("[0-9A-Za-z_]"),
                Some('W') => out.push_str("[^0-9A-Za-z_]"),
                // backspace inside a class
                Some('b') if in_class => out.push_str("\\x08"),
                Some('b') => out.push_str("(?-u:\\b)"),
                Some('B') if !in_class => out.push_str("(?-u:\\B)"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '[' if in_class => out.push_str("\\["),
            '[' => {
                in_class = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            other => out.push(other),
        }
    }

    out
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_order_is_fixed() {
        let schema = Schema::from_value(&json!({
            "code": {"regex": "^[A-Z]+$", "length": 5, "type": "string", "value": "ABCDE"}
        }))
        .unwrap();

        let kinds: Vec<_> = schema.rules()[0].constraints.iter().map(Constraint::kind).collect();
        assert_eq!(kinds, ["value", "type", "length", "regex"]);
    }

    #[test]
    fn test_contains_prefix_is_stripped() {
        let schema = Schema::from_value(&json!({"*category": {"value": "elect"}})).unwrap();
        let rule = schema.rule("category").unwrap();
        match &rule.constraints[0] {
            Constraint::Value(v) => assert_eq!(v.mode, MatchMode::Contains),
            other => panic!("unexpected constraint {:?}", other),
        }
    }

    #[test]
    fn test_optional_flags() {
        let schema = Schema::from_value(&json!({
            "a": {"type": "string", "optional": true},
            "b": {"type": "string", "required": false},
            "c": {"type": "string", "required": true},
            "d": {"type": "string"}
        }))
        .unwrap();

        let flags: Vec<_> = schema.rules().iter().map(|r| r.optional).collect();
        assert_eq!(flags, [true, true, false, false]);
    }

    #[test]
    fn test_version_skipped_at_every_level() {
        let schema = Schema::from_value(&json!({
            "version": {"type": "number", "value": 3},
            "items": {
                "type": "array",
                "nestedSchema": {"version": {"value": 1}, "id": {"type": "string"}}
            }
        }))
        .unwrap();

        assert_eq!(schema.len(), 1);
        let nested = schema.rules()[0].nested_schema().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.rules()[0].name, "id");
    }

    #[test]
    fn test_empty_type_is_untyped() {
        let schema = Schema::from_value(&json!({"note": {"type": "", "description": "free text"}})).unwrap();
        let rule = &schema.rules()[0];
        assert!(rule.field_type().is_none());
        assert!(rule.constraints.is_empty());
        assert_eq!(rule.description.as_deref(), Some("free text"));
    }

    #[test]
    fn test_nested_schema_ignored_for_scalar_types() {
        let schema = Schema::from_value(&json!({
            "name": {"type": "string", "nestedSchema": {"x": {"type": "string"}}}
        }))
        .unwrap();
        assert!(schema.rules()[0].nested_schema().is_none());
    }

    #[test]
    fn test_length_parsing() {
        let schema = Schema::from_value(&json!({"a": {"length": "5"}, "b": {"length": 3.7}})).unwrap();
        let lengths: Vec<_> = schema
            .rules()
            .iter()
            .map(|r| match r.constraints[0] {
                Constraint::Length(l) => l.expected,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(lengths, [5, 3]);

        let err = Schema::from_value(&json!({"a": {"length": "five"}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLength { .. }));
    }

    #[test]
    fn test_invalid_regex_is_schema_error() {
        let err = Schema::from_value(&json!({
            "items": {"type": "array", "nestedSchema": {"id": {"regex": "([a-z"}}}
        }))
        .unwrap_err();

        match err {
            SchemaError::InvalidRegex { path, pattern, .. } => {
                assert_eq!(path, "items.id");
                assert_eq!(pattern, "([a-z");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            Schema::from_value(&json!([1, 2])),
            Err(SchemaError::NotAnObject { .. })
        ));
        assert!(matches!(
            Schema::from_value(&json!({"a": "string"})),
            Err(SchemaError::InvalidRule { .. })
        ));
        assert!(matches!(
            Schema::from_value(&json!({"a": {"type": 5}})),
            Err(SchemaError::InvalidType { .. })
        ));
        assert!(matches!(
            Schema::from_json_str("{not json"),
            Err(SchemaError::Malformed { .. })
        ));
    }

    fn pattern(source: &str) -> Regex {
        match &Schema::from_value(&json!({"f": {"regex": source}})).unwrap().rules()[0].constraints[0] {
            Constraint::Pattern(p) => {
                assert_eq!(p.pattern, source);
                p.regex.clone()
            }
            other => panic!("unexpected constraint {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_classes_are_ascii() {
        assert!(pattern(r"^\d+$").is_match("0123"));
        assert!(!pattern(r"^\d+$").is_match("٣"));
        assert!(!pattern(r"^\w+$").is_match("é"));
        assert!(pattern(r"^\W$").is_match("é"));
        assert!(pattern(r"^[\d-]+$").is_match("12-34"));
        assert!(!pattern(r"^[\w.]+$").is_match("naïve"));
        assert!(pattern(r"\bid\b").is_match("user id 7"));
        assert!(pattern(r"\bid\b").is_match("éid"));
        assert!(pattern(r"^\s$").is_match("\u{a0}"));
    }

    #[test]
    fn test_escaped_backslash_is_not_a_shorthand() {
        assert!(pattern(r"^\\d$").is_match(r"\d"));
        assert!(!pattern(r"^\\d$").is_match("7"));
    }

    #[test]
    fn test_bracket_inside_class_is_literal() {
        assert!(pattern(r"^[[a]+$").is_match("[a["));
        assert_eq!(ascii_shorthands(r"[a[]\d"), r"[a\[][0-9]");
    }
}
