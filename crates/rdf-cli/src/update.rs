//! # Update-Format Subcommand
//!
//! Upgrades a document to the latest format of its type and writes the
//! result as YAML, to a file or to the output stream. Migration notes are
//! reported on the log, one per note.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rdf_engine::Engine;

/// Arguments for the update-format subcommand.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Document to upgrade.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Write the upgraded document here instead of to stdout.
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

/// Execute the update-format subcommand.
///
/// Returns 1 if the document cannot be upgraded.
pub fn run_update(args: &UpdateArgs, engine: &Engine, out: &mut dyn Write) -> Result<u8> {
    let doc = crate::read_document(&args.path)?;
    let report = match engine.update_format(&doc) {
        Ok(report) => report,
        Err(err) => {
            writeln!(out, "{}: error: {err}", args.path.display())?;
            return Ok(1);
        }
    };

    for step in &report.applied {
        tracing::info!(%step, "applied migration");
    }
    for note in &report.notes {
        tracing::warn!(%note, "migration note");
    }

    let yaml = report
        .document
        .to_yaml_string()
        .context("failed to serialize upgraded document")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &yaml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(
                out,
                "{} -> {} ({} steps, {} notes)",
                args.path.display(),
                path.display(),
                report.applied.len(),
                report.notes.len()
            )?;
        }
        None => out.write_all(yaml.as_bytes())?,
    }
    Ok(0)
}
