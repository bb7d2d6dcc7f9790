//! Shared utilities for command handlers

use crate::error::{Error, Result};
use evcheck_core::Schema;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}

/// Read a JSON or YAML document, choosing the parser by extension
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;

    let value = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "YAML parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "YAML".to_string(),
            }
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "JSON parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON".to_string(),
            }
        })?
    };

    Ok(value)
}

/// Read and parse a schema document
pub fn load_schema(path: &Path) -> Result<Schema> {
    let document = read_document(path)?;
    Ok(Schema::from_value(&document)?)
}

/// Event name implied by a schema file name (`purchase.yaml` -> `purchase`)
pub fn event_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("event")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_yaml_and_json() {
        let mut yaml = NamedTempFile::with_suffix(".yml").unwrap();
        writeln!(yaml, "user_id:\n  type: string").unwrap();
        let value = read_document(yaml.path()).unwrap();
        assert_eq!(value["user_id"]["type"], "string");

        let mut json = NamedTempFile::with_suffix(".json").unwrap();
        write!(json, r#"{{"amount": {{"type": "number"}}}}"#).unwrap();
        let schema = load_schema(json.path()).unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_read_invalid_document() {
        let mut json = NamedTempFile::with_suffix(".json").unwrap();
        write!(json, "{{not json").unwrap();
        assert!(matches!(
            read_document(json.path()),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_event_name_from_path() {
        assert_eq!(event_name_from_path(Path::new("schemas/purchase.yaml")), "purchase");
    }
}
