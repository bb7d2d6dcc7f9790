//! Daily statistics over outcome records
//!
//! Reads the JSON-lines files written by the record sink and aggregates them
//! per UTC day: error rows per event name, and an error rate over the
//! distinct event ids seen that day.

use crate::error::{Error, Result};
use crate::records::{RecordStatus, ValidationRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Which records take part in the aggregate
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// First day included
    pub since: Option<NaiveDate>,
    /// Last day included
    pub until: Option<NaiveDate>,
    /// Event names to keep; empty keeps all
    pub events: Vec<String>,
}

impl RecordFilter {
    fn accepts(&self, date: NaiveDate, event_name: &str) -> bool {
        self.since.map_or(true, |since| date >= since)
            && self.until.map_or(true, |until| date <= until)
            && (self.events.is_empty() || self.events.iter().any(|e| e == event_name))
    }
}

/// Aggregate for one UTC day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Distinct event ids seen that day
    pub total_events: usize,
    /// Distinct event ids with at least one error row
    pub error_events: usize,
    /// `error_events / total_events`, in percent
    pub error_rate: f64,
    /// Error rows per event name
    pub failures: BTreeMap<String, usize>,
}

/// Aggregate over a record file
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordStats {
    /// Records that passed the filter
    pub records: usize,
    /// Records whose timestamp could not be read
    pub skipped: usize,
    pub days: Vec<DailyStats>,
    /// Error rows in file order, when requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failure_log: Vec<ValidationRecord>,
}

impl RecordStats {
    /// Error rows across all days
    pub fn total_failures(&self) -> usize {
        self.days.iter().flat_map(|d| d.failures.values()).sum()
    }
}

#[derive(Default)]
struct DayAccumulator<'a> {
    events: HashSet<&'a str>,
    error_events: HashSet<&'a str>,
    failures: BTreeMap<String, usize>,
}

/// Read every record of a JSON-lines file; blank lines are ignored
pub fn read_records(path: &Path) -> Result<Vec<ValidationRecord>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| Error::MalformedRecord {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    tracing::debug!(path = %path.display(), count = records.len(), "Read outcome records");
    Ok(records)
}

/// UTC day of a record's timestamp
pub fn record_date(record: &ValidationRecord) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(&record.timestamp)
        .ok()
        .map(|at| at.with_timezone(&Utc).date_naive())
}

/// Aggregate records per day, oldest first
pub fn summarize(
    records: &[ValidationRecord],
    filter: &RecordFilter,
    keep_failures: bool,
) -> RecordStats {
    let mut stats = RecordStats::default();
    let mut days: BTreeMap<NaiveDate, DayAccumulator<'_>> = BTreeMap::new();

    for record in records {
        let date = match record_date(record) {
            Some(date) => date,
            None => {
                tracing::warn!(
                    event_id = %record.event_id,
                    timestamp = %record.timestamp,
                    "Skipping record with unreadable timestamp"
                );
                stats.skipped += 1;
                continue;
            }
        };
        if !filter.accepts(date, &record.event_name) {
            continue;
        }

        stats.records += 1;
        let day = days.entry(date).or_default();
        day.events.insert(&record.event_id);

        if record.status == RecordStatus::Error {
            day.error_events.insert(&record.event_id);
            *day.failures.entry(record.event_name.clone()).or_insert(0) += 1;
            if keep_failures {
                stats.failure_log.push(record.clone());
            }
        }
    }

    stats.days = days
        .into_iter()
        .map(|(date, day)| {
            let total_events = day.events.len();
            let error_events = day.error_events.len();
            let error_rate = if total_events == 0 {
                0.0
            } else {
                error_events as f64 / total_events as f64 * 100.0
            };
            DailyStats {
                date,
                total_events,
                error_events,
                error_rate,
                failures: day.failures,
            }
        })
        .collect();

    stats
}
