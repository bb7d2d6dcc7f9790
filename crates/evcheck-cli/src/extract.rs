//! Payload field extraction
//!
//! Locates the event name, event id and validated body inside a payload
//! using simple dotted paths with bracketed indexes (`meta.events[0].name`).

use crate::config::EventConfig;
use crate::error::{Error, Result};
use evcheck_core::EventIdentity;
use serde_json::Value;
use uuid::Uuid;

/// One step of a payload path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access
    Key(String),
    /// Array element access
    Index(usize),
}

/// Parse a dotted/bracketed path into segments
pub fn parse_path(path: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();

    for (position, part) in path.split('.').enumerate() {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };

        if key.is_empty() {
            // only a leading index may stand without a key
            if rest.is_empty() || position > 0 {
                return Err(Error::config(format!("empty segment in path '{}'", path)));
            }
        } else {
            segments.push(Segment::Key(key.to_string()));
        }

        while !rest.is_empty() {
            let close = rest
                .find(']')
                .filter(|_| rest.starts_with('['))
                .ok_or_else(|| Error::config(format!("malformed index in path '{}'", path)))?;
            let index = rest[1..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::config(format!("invalid index in path '{}'", path)))?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}

/// Follow a path through a payload
pub fn lookup<'a>(value: &'a Value, path: &str) -> Result<Option<&'a Value>> {
    let segments = parse_path(path)?;
    Ok(segments
        .iter()
        .try_fold(value, |current, segment| match segment {
            Segment::Key(key) => current.get(key.as_str()),
            Segment::Index(index) => current.get(*index),
        }))
}

/// Generate an id for payloads that carry none
pub fn generate_event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}

/// An identified payload ready for validation
#[derive(Debug, Clone)]
pub struct ExtractedEvent<'a> {
    pub identity: EventIdentity,
    pub body: &'a Value,
    /// True when the event id was generated rather than read
    pub generated_id: bool,
}

/// Extract identity and body from a payload according to the event config
///
/// Returns `Ok(None)` when the payload has no usable event name.
pub fn extract<'a>(payload: &'a Value, config: &EventConfig) -> Result<Option<ExtractedEvent<'a>>> {
    let event_name = match lookup(payload, &config.name_path)?.and_then(scalar_text) {
        Some(name) => name,
        None => return Ok(None),
    };

    Ok(Some(extract_named(payload, event_name, config)?))
}

/// Extract id and body for a payload whose event name is already known
pub fn extract_named<'a>(
    payload: &'a Value,
    event_name: impl Into<String>,
    config: &EventConfig,
) -> Result<ExtractedEvent<'a>> {
    let (event_id, generated_id) = match lookup(payload, &config.id_path)?.and_then(scalar_text) {
        Some(id) => (id, false),
        None => (generate_event_id(), true),
    };

    let body = match &config.body_path {
        Some(path) => lookup(payload, path)?
            .ok_or_else(|| Error::other(format!("payload has no body at '{}'", path)))?,
        None => payload,
    };

    Ok(ExtractedEvent {
        identity: EventIdentity::new(event_name, event_id),
        body,
        generated_id,
    })
}

/// Non-empty string or number text, trimmed
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
