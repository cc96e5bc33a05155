//! # Validate Subcommand
//!
//! Loads one document and renders its validation summary.
//!
//! Fail-fast load errors are rendered as a single top-level error; otherwise
//! the full summary is printed, warnings included. The exit code is 1 when
//! the document cannot be loaded or has `error` entries.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use rdf_engine::{Engine, LoadError, LoadOutcome};
use serde_json::json;

use crate::files::verify_local;

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per entry, then a status line.
    #[default]
    Text,
    /// A single JSON object.
    Json,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (`rdf.yaml`, `*.rdf.yaml`, or JSON).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Check that referenced local files exist and match their sha256.
    #[arg(long)]
    pub check_files: bool,
}

/// Execute the validate subcommand.
///
/// Returns the exit code: 0 if valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, engine: &Engine, out: &mut dyn Write) -> Result<u8> {
    let doc = crate::read_document(&args.path)?;

    let result = engine.load(&doc).and_then(|outcome| {
        if !args.check_files {
            return Ok(outcome);
        }
        let base_dir = args.path.parent().unwrap_or(Path::new("."));
        let files = verify_local(engine.required_files(&outcome.description), base_dir);
        tracing::info!(files = files.len(), "verified local files");
        engine.load_with_files(&doc, &files)
    });

    match result {
        Ok(outcome) => {
            render_outcome(&args.path, &outcome, args.format, out)?;
            Ok(if outcome.is_valid() { 0 } else { 1 })
        }
        Err(err) => {
            tracing::debug!(stage = err.stage(), "load failed");
            render_error(&args.path, &err, args.format, out)?;
            Ok(1)
        }
    }
}

fn render_outcome(
    path: &Path,
    outcome: &LoadOutcome,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(
                out,
                "{}: {} {}",
                path.display(),
                outcome.description.resource_type(),
                outcome.description.schema_version()
            )?;
            if !outcome.report.is_unchanged() {
                writeln!(
                    out,
                    "  upgraded with {} migration steps",
                    outcome.report.applied.len()
                )?;
            }
            writeln!(out, "{}", outcome.summary)?;
        }
        OutputFormat::Json => {
            let value = json!({
                "path": path.display().to_string(),
                "type": outcome.description.resource_type(),
                "format_version": outcome.description.schema_version().to_string(),
                "migrations": outcome.report.applied.len(),
                "summary": outcome.summary,
            });
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_error(
    path: &Path,
    err: &LoadError,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{}: error: {err}", path.display())?;
        }
        OutputFormat::Json => {
            let value = json!({
                "path": path.display().to_string(),
                "status": "failed",
                "stage": err.stage(),
                "error": err.to_string(),
            });
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
