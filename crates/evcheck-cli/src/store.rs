//! File-backed schema store keyed by event name
//!
//! Schemas live in a directory as `<event_name>.json`, `.yaml` or `.yml`.
//! Parsed schemas are cached in memory and reloaded whenever the file's
//! modification time or size differs from the cached copy, in either
//! direction, so a restored older file is picked up too.

use crate::handlers::utils::load_schema;
use anyhow::{bail, Context};
use evcheck_core::Schema;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Extensions tried for a schema file, in order
const SCHEMA_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Cached schema plus the file state it was parsed from
#[derive(Debug, Clone)]
struct CacheEntry {
    schema: Arc<Schema>,
    file_path: PathBuf,
    file_mtime: SystemTime,
    file_len: u64,
}

impl CacheEntry {
    fn is_fresh(&self, path: &Path, current_mtime: SystemTime, current_len: u64) -> bool {
        self.file_path == path && current_mtime == self.file_mtime && current_len == self.file_len
    }
}

/// Directory of schemas, shared across concurrent lookups
#[derive(Debug)]
pub struct SchemaStore {
    dir: PathBuf,
    cache_enabled: bool,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SchemaStore {
    /// Create a store over a schema directory
    pub fn new(dir: impl Into<PathBuf>, cache_enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            cache_enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The directory schemas are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate the schema file for an event name
    pub fn schema_path(&self, event_name: &str) -> anyhow::Result<Option<PathBuf>> {
        if event_name.is_empty()
            || event_name.contains(['/', '\\'])
            || event_name.starts_with('.')
        {
            bail!("event name '{}' cannot name a schema file", event_name);
        }

        Ok(SCHEMA_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", event_name, ext)))
            .find(|path| path.is_file()))
    }

    /// Fetch the schema for an event name, or `None` when no file exists
    pub fn get(&self, event_name: &str) -> anyhow::Result<Option<Arc<Schema>>> {
        let path = match self.schema_path(event_name)? {
            Some(path) => path,
            None => return Ok(None),
        };

        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        let mtime = metadata
            .modified()
            .with_context(|| format!("reading modification time of {}", path.display()))?;
        let len = metadata.len();

        if self.cache_enabled {
            if let Some(entry) = self.lock()?.get(event_name) {
                if entry.is_fresh(&path, mtime, len) {
                    tracing::trace!(event_name, "Schema cache hit");
                    return Ok(Some(Arc::clone(&entry.schema)));
                }
            }
        }

        let schema = Arc::new(
            load_schema(&path)
                .with_context(|| format!("loading schema for '{}' from {}", event_name, path.display()))?,
        );
        tracing::debug!(event_name, path = %path.display(), rules = schema.len(), "Loaded schema");

        if self.cache_enabled {
            self.lock()?.insert(
                event_name.to_string(),
                CacheEntry {
                    schema: Arc::clone(&schema),
                    file_path: path,
                    file_mtime: mtime,
                    file_len: len,
                },
            );
        }

        Ok(Some(schema))
    }

    /// Number of cached schemas
    pub fn cached_len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("schema cache lock poisoned"))
    }
}
