//! Validate command handler

use super::utils::{event_name_from_path, load_schema, read_document};
use super::{finish, record_sink};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{format_error, Result};
use crate::extract::extract_named;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use evcheck_core::{EventValidator, ValidationReport};
use std::path::Path;

/// Handle the validate command
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    output.info(&format!("Loading schema: {}", args.schema.display()))?;

    let schema = {
        let _timer = Timer::with_details("schema_loading", &args.schema.to_string_lossy());
        load_schema(&args.schema)?
    };
    let event_name = args
        .event_name
        .clone()
        .unwrap_or_else(|| event_name_from_path(&args.schema));
    let validator = EventValidator::new(schema);
    let show_valid = args.show_valid || config.output.show_valid;

    let mut reports = Vec::with_capacity(args.payloads.len());
    let mut failed = 0;

    for payload in &args.payloads {
        match validate_payload(&validator, &event_name, payload, config) {
            Ok(report) => {
                if !report.is_valid() {
                    failed += 1;
                }
                output.report(&report, show_valid)?;
                reports.push(report);
            }
            Err(e) if args.payloads.len() == 1 => return Err(e),
            Err(e) => {
                failed += 1;
                tracing::warn!(payload = %payload.display(), error = %e, "Payload could not be validated");
                eprintln!("{}: {}", payload.display(), format_error(&e, false));
            }
        }
    }

    let sink = record_sink(config, args.records);
    finish(&reports, failed, args.payloads.len(), sink.as_ref(), output)
}

fn validate_payload(
    validator: &EventValidator,
    event_name: &str,
    payload: &Path,
    config: &Config,
) -> Result<ValidationReport> {
    let _timer = Timer::with_details("payload_validation", &payload.to_string_lossy());

    let document = read_document(payload)?;
    let event = extract_named(&document, event_name, &config.event)?;
    if event.generated_id {
        tracing::debug!(event_id = %event.identity.event_id, "Generated event id");
    }

    Ok(validator.validate(event.body, &event.identity)?)
}
