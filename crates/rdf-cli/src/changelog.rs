//! # Changelog Subcommand
//!
//! Prints the migration chain of one resource type, oldest step first.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;
use rdf_core::ResourceTypeId;
use rdf_engine::Engine;

/// Arguments for the changelog subcommand.
#[derive(Args, Debug)]
pub struct ChangelogArgs {
    /// Resource type (`generic`, `rdf`, `model`, `dataset`, `application`,
    /// `notebook`, `collection`).
    #[arg(value_name = "TYPE")]
    pub resource_type: String,

    /// Only list steps that cross a minor version.
    #[arg(long)]
    pub breaking: bool,
}

/// Execute the changelog subcommand.
pub fn run_changelog(args: &ChangelogArgs, engine: &Engine, out: &mut dyn Write) -> Result<u8> {
    let Some(resource_type) = ResourceTypeId::from_type_literal(&args.resource_type) else {
        bail!("unknown resource type {:?}", args.resource_type);
    };
    for step in engine.changelog(resource_type) {
        if args.breaking && !step.breaking {
            continue;
        }
        writeln!(out, "{step}")?;
    }
    Ok(0)
}
