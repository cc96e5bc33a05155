//! # rdf CLI Entry Point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rdf_cli::changelog::{run_changelog, ChangelogArgs};
use rdf_cli::update::{run_update, UpdateArgs};
use rdf_cli::validate::{run_validate, ValidateArgs};

/// Resource description toolchain.
///
/// Validates resource descriptions, upgrades them to the latest format,
/// and lists the migrations between format versions.
#[derive(Parser, Debug)]
#[command(name = "rdf", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to an engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a document and report every validation finding.
    Validate(ValidateArgs),

    /// Upgrade a document to the latest format version of its type.
    UpdateFormat(UpdateArgs),

    /// List the migration steps of a resource type.
    Changelog(ChangelogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let engine = match rdf_cli::build_engine(cli.config.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &engine, &mut out),
        Commands::UpdateFormat(args) => run_update(args, &engine, &mut out),
        Commands::Changelog(args) => run_changelog(args, &engine, &mut out),
    };
    let _ = out.flush();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_cli::validate::OutputFormat;

    #[test]
    fn parse_validate_with_flags() {
        let cli =
            Cli::try_parse_from(["rdf", "validate", "rdf.yaml", "--format", "json", "--check-files"])
                .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.path, PathBuf::from("rdf.yaml"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.check_files);
    }

    #[test]
    fn validate_defaults_to_text() {
        let cli = Cli::try_parse_from(["rdf", "validate", "rdf.yaml"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.check_files);
    }

    #[test]
    fn parse_update_format_with_output() {
        let cli = Cli::try_parse_from(["rdf", "update-format", "old.yaml", "-o", "new.yaml"]).unwrap();
        let Commands::UpdateFormat(args) = cli.command else {
            panic!("expected update-format");
        };
        assert_eq!(args.output, Some(PathBuf::from("new.yaml")));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "rdf",
            "changelog",
            "model",
            "-vv",
            "--config",
            "rdf.config.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("rdf.config.yaml")));
        assert!(matches!(cli.command, Commands::Changelog(_)));
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["rdf", "validate"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["rdf", "validate", "rdf.yaml", "--format", "xml"]).is_err());
    }
}
