//! # rdf-engine — Resource Description Load Pipeline
//!
//! The façade the CLI and other callers use. An [`Engine`] is built once
//! from an [`rdf_core::EngineConfig`]; building checks the configuration,
//! the schema registry and the migration chains, so a running engine never
//! meets an inconsistent registry.
//!
//! ## Operations
//!
//! | Operation                     | Result                                         |
//! |-------------------------------|------------------------------------------------|
//! | [`Engine::load`]              | typed description + summary, or [`LoadError`]  |
//! | [`Engine::load_with_files`]   | same, with file verification entries           |
//! | [`Engine::update_format`]     | document upgraded to latest, with notes        |
//! | [`Engine::required_files`]    | files a description refers to                  |
//! | [`Engine::changelog`]         | migration steps of a resource type             |
//!
//! ## Crate Policy
//!
//! - No I/O. Callers read documents and verify files.
//! - Logging through `tracing`; the subscriber is installed by binaries.

pub mod engine;
pub mod error;

pub use engine::{Engine, LoadOutcome};
pub use error::LoadError;
