//! Check command handler
//!
//! Resolves each payload's schema from the schema store by event name and
//! validates the payloads concurrently on the blocking pool.

use super::utils::read_document;
use super::{finish, record_sink};
use crate::cli::CheckArgs;
use crate::config::{Config, EventConfig};
use crate::error::{format_error, Error, Result};
use crate::extract::extract;
use crate::output::OutputWriter;
use crate::store::SchemaStore;
use evcheck_core::{EventValidator, Schema, ValidationReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::Instrument;

/// Handle the check command
pub async fn handle_check(
    args: CheckArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let dir = args
        .schemas_dir
        .clone()
        .unwrap_or_else(|| config.schemas.dir.clone());
    if !dir.is_dir() {
        return Err(Error::config(format!(
            "schema directory {} does not exist",
            dir.display()
        )));
    }

    let store = Arc::new(SchemaStore::new(dir, config.schemas.cache));
    output.info(&format!(
        "Checking {} payload(s) against schemas in {}",
        args.payloads.len(),
        store.dir().display()
    ))?;

    let results = check_all(&args.payloads, Arc::clone(&store), &config.event).await?;

    let show_valid = args.show_valid || config.output.show_valid;
    let total = results.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = 0;

    for (payload, result) in args.payloads.iter().zip(results) {
        match result {
            Ok(report) => {
                if !report.is_valid() {
                    failed += 1;
                }
                output.report(&report, show_valid)?;
                reports.push(report);
            }
            Err(e) if total == 1 => return Err(e),
            Err(e) => {
                failed += 1;
                tracing::warn!(payload = %payload.display(), error = %e, "Payload could not be checked");
                eprintln!("{}: {}", payload.display(), format_error(&e, false));
            }
        }
    }

    tracing::debug!(cached = store.cached_len(), "Schema store after check");

    let sink = record_sink(config, args.records);
    finish(&reports, failed, total, sink.as_ref(), output)
}

/// Validate every payload on the blocking pool; results keep input order
pub async fn check_all(
    payloads: &[PathBuf],
    store: Arc<SchemaStore>,
    event_config: &EventConfig,
) -> Result<Vec<Result<ValidationReport>>> {
    let event_config = Arc::new(event_config.clone());

    let handles: Vec<_> = payloads
        .iter()
        .cloned()
        .map(|payload| {
            let store = Arc::clone(&store);
            let event_config = Arc::clone(&event_config);
            let span = tracing::debug_span!("check_payload", payload = %payload.display());
            task::spawn_blocking(move || {
                let _entered = span.enter();
                check_payload(&payload, &store, &event_config)
            })
            .in_current_span()
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| Error::other(format!("validation task failed: {}", e)))?;
        results.push(result);
    }
    Ok(results)
}

fn check_payload(
    payload: &Path,
    store: &SchemaStore,
    event_config: &EventConfig,
) -> Result<ValidationReport> {
    let document = read_document(payload)?;

    let event = extract(&document, event_config)?.ok_or_else(|| Error::EventNameMissing {
        path: event_config.name_path.clone(),
        file: payload.to_path_buf(),
    })?;

    let schema: Arc<Schema> = store
        .get(&event.identity.event_name)?
        .ok_or_else(|| Error::SchemaNotFound {
            event_name: event.identity.event_name.clone(),
            dir: store.dir().to_path_buf(),
        })?;

    let validator = EventValidator::new(schema);
    Ok(validator.validate(event.body, &event.identity)?)
}
