//! # rdf-cli — Resource Description Command-Line Interface
//!
//! The `rdf` binary. Reads documents from disk, hands them to an
//! [`rdf_engine::Engine`], and renders the outcome.
//!
//! ## Subcommands
//!
//! - `rdf validate <path>` — Load and validate a document; exit 1 on errors.
//! - `rdf update-format <path>` — Upgrade a document to the latest format.
//! - `rdf changelog <type>` — Print the migration steps of a resource type.
//!
//! ```bash
//! rdf validate model/rdf.yaml --check-files
//! rdf validate model/rdf.yaml --format json
//! rdf update-format model/rdf.yaml -o model/rdf.latest.yaml
//! rdf changelog model
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | success, no `error` entries                       |
//! | 1    | the document has errors or cannot be loaded       |
//! | 2    | operational failure (unreadable file, bad config) |
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed
//!   arguments and a writer so they can be tested without a process.
//! - All file reads happen here, never in the library crates.

pub mod changelog;
pub mod files;
pub mod update;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use rdf_core::{EngineConfig, RawDocument};
use rdf_engine::Engine;

/// Read an engine configuration, or use the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = EngineConfig::from_yaml_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded configuration");
    Ok(config)
}

/// Build an engine from an optional configuration file.
pub fn build_engine(config: Option<&Path>) -> Result<Engine> {
    let config = load_config(config)?;
    Engine::new(config).context("engine configuration rejected")
}

/// Read and parse a document.
pub fn read_document(path: &Path) -> Result<RawDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    RawDocument::from_yaml_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
