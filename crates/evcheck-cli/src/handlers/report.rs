//! Report command handler
//!
//! Summarizes an outcome record file per UTC day.

use crate::cli::{OutputFormat, ReportArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::stats::{read_records, summarize, DailyStats, RecordFilter, RecordStats};

/// Handle the report command
pub fn handle_report(args: ReportArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let path = args
        .records
        .or_else(|| config.records.file.clone())
        .ok_or_else(|| Error::config("no record file given and records.file is not configured"))?;

    if let (Some(since), Some(until)) = (args.since, args.until) {
        if since > until {
            return Err(Error::config(format!(
                "--since {} is after --until {}",
                since, until
            )));
        }
    }

    let records = read_records(&path)?;
    let filter = RecordFilter {
        since: args.since,
        until: args.until,
        events: args.events,
    };
    let stats = summarize(&records, &filter, args.failures);
    tracing::info!(
        path = %path.display(),
        records = stats.records,
        days = stats.days.len(),
        "Summarized outcome records"
    );

    if output.format() != OutputFormat::Human {
        return output.data(&stats);
    }

    output.info(&format!(
        "{} record(s) from {}",
        stats.records,
        path.display()
    ))?;
    if stats.skipped > 0 {
        output.info(&format!("{} record(s) skipped: unreadable timestamp", stats.skipped))?;
    }
    if stats.days.is_empty() {
        output.info("No records in the selected range")?;
        return Ok(());
    }

    for day in &stats.days {
        output.writeln(&format_day_human(day))?;
    }
    write_failure_log(&stats, output)
}

fn format_day_human(day: &DailyStats) -> String {
    let mut text = format!(
        "📅 {}  {} event(s), {} failed, error rate {:.1}%",
        day.date, day.total_events, day.error_events, day.error_rate
    );
    for (event_name, count) in &day.failures {
        text.push_str(&format!("\n   {}: {} failure(s)", event_name, count));
    }
    text
}

fn write_failure_log(stats: &RecordStats, output: &mut OutputWriter) -> Result<()> {
    if stats.failure_log.is_empty() {
        return Ok(());
    }

    output.writeln(&format!("Failures ({}):", stats.failure_log.len()))?;
    for record in &stats.failure_log {
        output.writeln(&format!(
            "  {} {} ({}) 📍 {} [{}] expected {}, got {}",
            record.timestamp,
            record.event_name,
            record.event_id,
            record.field,
            record.error_type,
            record.expected,
            record.actual
        ))?;
    }
    Ok(())
}
