//! Walk context and per-call identity
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

/// Identity of the event a validation call is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventIdentity {
    pub event_name: String,
    pub event_id: String,
}

impl EventIdentity {
    pub fn new<N, I>(event_name: N, event_id: I) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        Self {
            event_name: event_name.into(),
            event_id: event_id.into(),
        }
    }
}

/// Context carried through one walk: the current field path and the call's
/// identity
#[derive(Debug, Clone)]
pub struct WalkContext<'a> {
    /// Current field path; empty at the document root
    pub path: String,
    pub identity: &'a EventIdentity,
}

impl<'a> WalkContext<'a> {
    /// Create a root context
    pub fn new(identity: &'a EventIdentity) -> Self {
        Self {
            path: String::new(),
            identity,
        }
    }

    /// Create a child context for a named field
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        let new_path = if self.path.is_empty() {
            path_segment.as_ref().to_string()
        } else {
            format!("{}.{}", self.path, path_segment.as_ref())
        };

        Self {
            path: new_path,
            identity: self.identity,
        }
    }

    /// Create a child context for an array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            identity: self.identity,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}
