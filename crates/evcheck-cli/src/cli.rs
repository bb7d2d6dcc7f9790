//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// evcheck - declarative validation for event payloads
///
/// Validates JSON/YAML event payloads against field-rule schemas and reports
/// every failing field with its path, expected and actual values.
#[derive(Parser, Debug)]
#[command(
    name = "evcheck",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "EVCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate payload files against an explicit schema file
    Validate(ValidateArgs),

    /// Validate payloads against the stored schema for their event name
    Check(CheckArgs),

    /// Check schema files for errors without validating any data
    Lint(LintArgs),

    /// Summarize an outcome record file per day
    Report(ReportArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the schema document (JSON or YAML)
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Payload files to validate (JSON or YAML)
    #[arg(value_name = "PAYLOAD", required = true)]
    pub payloads: Vec<PathBuf>,

    /// Event name to attribute results to (defaults to the schema file stem)
    #[arg(long)]
    pub event_name: Option<String>,

    /// Outcome record file override (JSON lines)
    #[arg(long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Include valid-field entries in the output
    #[arg(long)]
    pub show_valid: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Payload files to validate (JSON or YAML)
    #[arg(value_name = "PAYLOAD", required = true)]
    pub payloads: Vec<PathBuf>,

    /// Schema directory override
    #[arg(long, value_name = "DIR")]
    pub schemas_dir: Option<PathBuf>,

    /// Outcome record file override (JSON lines)
    #[arg(long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Include valid-field entries in the output
    #[arg(long)]
    pub show_valid: bool,
}

/// Arguments for the lint command
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Schema files to check (JSON or YAML)
    #[arg(value_name = "SCHEMA", required = true)]
    pub schemas: Vec<PathBuf>,
}

/// Arguments for the report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Outcome record file (JSON lines); defaults to `records.file` from the config
    #[arg(value_name = "RECORDS")]
    pub records: Option<PathBuf>,

    /// First UTC day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// Last UTC day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// Only include this event name (repeatable)
    #[arg(long = "event", value_name = "EVENT_NAME")]
    pub events: Vec<String>,

    /// List the failing records as well
    #[arg(long)]
    pub failures: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            output: OutputFormat::Human,
            no_color: false,
            command: Commands::Lint(LintArgs {
                schemas: vec![PathBuf::from("purchase.json")],
            }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 2,
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_parsing() {
        let cli = Cli::parse_from([
            "evcheck",
            "-vv",
            "validate",
            "--schema",
            "purchase.json",
            "a.json",
            "b.yaml",
        ]);
        assert_eq!(cli.verbosity_level(), 2);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.schema, PathBuf::from("purchase.json"));
                assert_eq!(args.payloads.len(), 2);
                assert!(!args.show_valid);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_report_parsing() {
        let cli = Cli::parse_from([
            "evcheck",
            "report",
            "audit.jsonl",
            "--since",
            "2025-03-01",
            "--event",
            "purchase",
            "--event",
            "signup",
        ]);
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.records, Some(PathBuf::from("audit.jsonl")));
                assert_eq!(args.since, NaiveDate::from_ymd_opt(2025, 3, 1));
                assert!(args.until.is_none());
                assert_eq!(args.events, ["purchase", "signup"]);
                assert!(!args.failures);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["evcheck", "report", "--since", "March"]).is_err());
    }

    #[test]
    fn test_check_requires_payload() {
        assert!(Cli::try_parse_from(["evcheck", "check"]).is_err());
    }
}
