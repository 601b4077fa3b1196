//! netxml: list, check and rewrite Kismet NetXML survey files.
//!
//! Usage:
//!   netxml list survey.netxml --clients
//!   netxml check survey.netxml --on-invalid skip
//!   netxml rewrite survey.netxml -o clean.netxml

mod cli;

use clap::{Parser, Subcommand, ValueEnum};
use cli::output::{self, Styled};
use netxml::{ParseOptions, ValidationPolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netxml")]
#[command(about = "Inspect and rewrite Kismet NetXML wireless survey files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show every warning and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// What to do with elements that fail validation
    #[arg(long, global = true, value_enum, default_value = "abort")]
    on_invalid: OnInvalid,
}

#[derive(Subcommand)]
enum Commands {
    /// List networks, one per line, as they are read
    List {
        /// Path to the .netxml file
        file: PathBuf,

        /// Also list each network's clients
        #[arg(long)]
        clients: bool,
    },

    /// Parse a whole file and report counts, warnings and rejected elements
    Check {
        /// Path to the .netxml file
        file: PathBuf,
    },

    /// Parse a file and serialize it again
    Rewrite {
        /// Path to the .netxml file
        file: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OnInvalid {
    /// Drop the invalid element and keep going
    Skip,
    /// Stop at the first invalid element
    Abort,
}

impl From<OnInvalid> for ValidationPolicy {
    fn from(arg: OnInvalid) -> Self {
        match arg {
            OnInvalid::Skip => ValidationPolicy::Skip,
            OnInvalid::Abort => ValidationPolicy::Abort,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Command modules read these instead of threading flags through.
    if cli.json {
        std::env::set_var("NETXML_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("NETXML_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("NETXML_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("NETXML_NO_COLOR", "1");
    }

    init_tracing(cli.verbose, cli.quiet);

    let options = ParseOptions {
        on_invalid: cli.on_invalid.into(),
    };
    let result = match &cli.command {
        Commands::List { file, clients } => cli::list_cmd::run(file, options, *clients),
        Commands::Check { file } => cli::check_cmd::run(file, options),
        Commands::Rewrite { file, output } => {
            cli::rewrite_cmd::run(file, output.as_deref(), options)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "error": format!("{err:#}"),
                    "position": err
                        .chain()
                        .find_map(|cause| cause.downcast_ref::<netxml::ParseError>())
                        .and_then(netxml::ParseError::position),
                }));
            } else {
                let s = Styled::new();
                eprintln!("  {} {err:#}", s.fail_sym());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let directive = if verbose {
        "netxml=debug"
    } else if quiet {
        "netxml=error"
    } else {
        "netxml=warn"
    };
    let filter = EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::WARN.into()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_on_invalid_defaults_to_abort() {
        let cli = Cli::parse_from(["netxml", "check", "survey.netxml"]);
        assert_eq!(
            ValidationPolicy::from(cli.on_invalid),
            ValidationPolicy::Abort
        );

        let cli = Cli::parse_from(["netxml", "list", "--on-invalid", "skip", "a.netxml", "--clients"]);
        assert_eq!(ValidationPolicy::from(cli.on_invalid), ValidationPolicy::Skip);
        assert!(matches!(cli.command, Commands::List { clients: true, .. }));
    }

    #[test]
    fn test_rewrite_output_flag() {
        let cli = Cli::parse_from(["netxml", "--json", "rewrite", "in.netxml", "-o", "out.netxml"]);
        assert!(cli.json);
        match cli.command {
            Commands::Rewrite { output, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.netxml")));
            }
            _ => panic!("expected rewrite"),
        }
    }
}
