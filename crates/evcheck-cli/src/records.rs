//! Outcome record sink
//!
//! Flattens validation reports into one record per entry and appends them
//! to a JSON-lines file. Every report leaves at least one record: a report
//! that yields no entry rows gets a single event-level `valid` row with an
//! empty `field`, so daily error rates can count clean events too.

use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use evcheck_core::{coerce, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Record status column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Error,
    Valid,
}

/// One flat outcome row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub event_id: String,
    pub event_name: String,
    pub field: String,
    pub error_type: String,
    pub expected: String,
    pub actual: String,
    /// RFC 3339 UTC
    pub timestamp: String,
    pub status: RecordStatus,
}

impl ValidationRecord {
    /// Flatten a report; valid entries are included only when asked
    ///
    /// A report with no rows to write becomes one event-level `valid` row.
    pub fn from_report(
        report: &ValidationReport,
        include_valid: bool,
        at: DateTime<Utc>,
    ) -> Vec<Self> {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);

        let errors = report.errors.iter().map(|entry| Self {
            event_id: report.event_id.clone(),
            event_name: report.event_name.clone(),
            field: entry.field.clone(),
            error_type: entry.kind.to_string(),
            expected: entry.expected.clone(),
            actual: entry.actual.clone(),
            timestamp: timestamp.clone(),
            status: RecordStatus::Error,
        });

        let valid = report
            .valid
            .iter()
            .filter(|_| include_valid)
            .map(|entry| Self {
                event_id: report.event_id.clone(),
                event_name: report.event_name.clone(),
                field: entry.field.clone(),
                error_type: String::new(),
                expected: entry.field_type.clone(),
                actual: coerce::value_to_string(&entry.value),
                timestamp: timestamp.clone(),
                status: RecordStatus::Valid,
            });

        let mut records: Vec<Self> = errors.chain(valid).collect();
        if records.is_empty() {
            records.push(Self {
                event_id: report.event_id.clone(),
                event_name: report.event_name.clone(),
                field: String::new(),
                error_type: String::new(),
                expected: String::new(),
                actual: String::new(),
                timestamp,
                status: RecordStatus::Valid,
            });
        }
        records
    }

    /// Whether this is the event-level row of a clean report
    pub fn is_event_row(&self) -> bool {
        self.field.is_empty()
    }
}

/// Appends records to a JSON-lines file
#[derive(Debug, Clone)]
pub struct RecordSink {
    path: PathBuf,
    include_valid: bool,
}

impl RecordSink {
    pub fn new(path: impl Into<PathBuf>, include_valid: bool) -> Self {
        Self {
            path: path.into(),
            include_valid,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every record of the given reports, returning how many were written
    pub fn append<'a, I>(&self, reports: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ValidationReport>,
    {
        let now = Utc::now();
        let records: Vec<ValidationRecord> = reports
            .into_iter()
            .flat_map(|report| ValidationRecord::from_report(report, self.include_valid, now))
            .collect();

        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for record in &records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Appended outcome records");
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use evcheck_core::{validate_document, EventIdentity};
    use serde_json::json;
    use tempfile::TempDir;

    fn report() -> ValidationReport {
        validate_document(
            &json!({"event_name": {"type": "string"}, "amount": {"type": "number"}}),
            &json!({"event_name": "purchase", "amount": "12"}),
            &EventIdentity::new("purchase", "evt-7"),
        )
        .unwrap()
    }

    #[test]
    fn test_records_from_report() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let records = ValidationRecord::from_report(&report(), false, at);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.event_id, "evt-7");
        assert_eq!(record.field, "amount");
        assert_eq!(record.error_type, "type_mismatch");
        assert_eq!(record.expected, "number");
        assert_eq!(record.actual, "string");
        assert_eq!(record.timestamp, "2025-03-01T12:00:00.000Z");
        assert_eq!(record.status, RecordStatus::Error);

        let with_valid = ValidationRecord::from_report(&report(), true, at);
        assert_eq!(with_valid.len(), 2);
        assert_eq!(with_valid[1].status, RecordStatus::Valid);
        assert_eq!(with_valid[1].field, "event_name");
        assert_eq!(with_valid[1].actual, "purchase");
    }

    #[test]
    fn test_sink_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let sink = RecordSink::new(dir.path().join("audit").join("records.jsonl"), false);

        assert_eq!(sink.append([&report()]).unwrap(), 1);
        assert_eq!(sink.append([&report(), &report()]).unwrap(), 2);

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<ValidationRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|r| r.status == RecordStatus::Error));
    }

    #[test]
    fn test_clean_report_leaves_event_row() {
        let dir = TempDir::new().unwrap();
        let sink = RecordSink::new(dir.path().join("records.jsonl"), false);
        let clean = validate_document(
            &json!({"a": {"type": "string"}}),
            &json!({"a": "x"}),
            &EventIdentity::new("e", "1"),
        )
        .unwrap();

        assert_eq!(sink.append([&clean]).unwrap(), 1);
        let content = std::fs::read_to_string(sink.path()).unwrap();
        let record: ValidationRecord = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(record.event_id, "1");
        assert_eq!(record.status, RecordStatus::Valid);
        assert!(record.is_event_row());
    }

    #[test]
    fn test_event_row_only_when_nothing_else_is_written() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let clean = validate_document(
            &json!({"a": {"type": "string"}, "b": {"type": "number", "optional": true}}),
            &json!({"a": "x"}),
            &EventIdentity::new("e", "1"),
        )
        .unwrap();

        let with_valid = ValidationRecord::from_report(&clean, true, at);
        assert_eq!(with_valid.len(), 1);
        assert_eq!(with_valid[0].field, "a");

        let empty_schema = validate_document(&json!({}), &json!({}), &EventIdentity::new("e", "2")).unwrap();
        let rows = ValidationRecord::from_report(&empty_schema, true, at);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_event_row());
    }
}
