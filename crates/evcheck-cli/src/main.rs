//! evcheck CLI - validate event payloads against declarative schemas
//!
//! This is the main entry point for the evcheck CLI application, providing
//! commands for validating payloads against explicit or stored schemas,
//! linting schema files, summarizing outcome records, and generating shell
//! completions.

mod cli;
mod config;
mod error;
mod extract;
mod handlers;
mod logging;
mod output;
mod records;
mod stats;
mod store;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Configuration first, so its logging section can shape the subscriber
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, cli.use_color()));
            process::exit(e.exit_code());
        }
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        schemas_dir = %config.schemas.dir.display(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output).await,
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output).await,
        Commands::Lint(args) => handlers::handle_lint(args, &mut output),
        Commands::Report(args) => handlers::handle_report(args, &config, &mut output),
        Commands::Completions(args) => {
            handlers::handle_completions(args, &mut std::io::stdout().lock())
        }
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    // Verbosity flags outrank the file's level
    if cli.verbosity_level() == 0 {
        logging_config.apply_file_config(&config.logging);
    } else {
        let level = logging_config.level.clone();
        logging_config.apply_file_config(&config.logging);
        logging_config.level = level;
    }

    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
