//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables (via clap `env` bindings)
//! - Command-line overrides

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to find the event name, id and body inside a payload
    pub event: EventConfig,

    /// Schema store settings
    pub schemas: SchemaStoreConfig,

    /// Outcome record sink settings
    pub records: RecordsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Payload field locations, as dotted paths (`meta.name`, `events[0].id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Path of the event name
    pub name_path: String,

    /// Path of the event id; a fresh id is generated when absent
    pub id_path: String,

    /// Path of the document to validate; the whole payload when unset
    pub body_path: Option<String>,
}

/// Schema store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaStoreConfig {
    /// Directory holding `<event_name>.json|yaml|yml` schema files
    pub dir: PathBuf,

    /// Keep parsed schemas in memory between lookups
    pub cache: bool,
}

/// Outcome record configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// JSON-lines file that records are appended to
    pub file: Option<PathBuf>,

    /// Also write a record for every valid entry
    pub include_valid: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show valid-field entries in human output
    pub show_valid: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name_path: "event_name".to_string(),
            id_path: "event_id".to_string(),
            body_path: None,
        }
    }
}

impl Default for SchemaStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("schemas"),
            cache: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_valid: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "YAML or JSON".to_string(),
                })
            }
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                // logging is not initialized yet, so warnings go straight to stderr
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.event.name_path.trim().is_empty() {
            return Err(Error::config("event.name_path must not be empty"));
        }
        if self.event.id_path.trim().is_empty() {
            return Err(Error::config("event.id_path must not be empty"));
        }
        if let Some(format) = &self.logging.format {
            if !matches!(format.as_str(), "compact" | "full" | "json") {
                return Err(Error::config(format!(
                    "unknown logging.format '{}' (expected compact, full or json)",
                    format
                )));
            }
        }
        Ok(())
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".evcheck.yaml"),
            PathBuf::from(".evcheck.yml"),
            PathBuf::from(".evcheck.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let evcheck_dir = config_dir.join("evcheck");
            paths.push(evcheck_dir.join("config.yaml"));
            paths.push(evcheck_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".evcheck.yaml"));
            paths.push(home_dir.join(".evcheck.json"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.event.name_path, "event_name");
        assert_eq!(config.event.id_path, "event_id");
        assert!(config.event.body_path.is_none());
        assert_eq!(config.schemas.dir, PathBuf::from("schemas"));
        assert!(config.schemas.cache);
        assert!(config.records.file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "event:\n  name_path: meta.name\n  body_path: payload\nrecords:\n  file: audit.jsonl\n  include_valid: true"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.event.name_path, "meta.name");
        assert_eq!(config.event.id_path, "event_id");
        assert_eq!(config.event.body_path.as_deref(), Some("payload"));
        assert_eq!(config.records.file, Some(PathBuf::from("audit.jsonl")));
        assert!(config.records.include_valid);
        assert!(config.schemas.cache);
    }

    #[test]
    fn test_json_config() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"schemas": {{"dir": "/srv/schemas", "cache": false}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.schemas.dir, PathBuf::from("/srv/schemas"));
        assert!(!config.schemas.cache);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = NamedTempFile::with_suffix(".toml").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/evcheck.yaml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.event.name_path = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.logging.format = Some("pretty".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
