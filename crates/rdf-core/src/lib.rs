//! # rdf-core — Foundational Types for Resource Descriptions
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate builds on: the untyped [`RawDocument`] handed to the
//! engine, the ordered [`VersionTag`], the closed [`ResourceTypeId`] set,
//! [`FieldPath`] locations, [`FileReference`]s crossing the I/O boundary,
//! and the fail-fast error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **Documents are immutable values.** A `RawDocument` has no mutation
//!    API. Migration steps clone the inner mapping, edit the copy, and wrap
//!    the result in a new `RawDocument`.
//!
//! 2. **Versions are totally ordered triples.** `VersionTag` compares
//!    `(major, minor, patch)` numerically, never lexically, so `0.4.10`
//!    sorts after `0.4.9`.
//!
//! 3. **Closed resource type set.** `ResourceTypeId` is an exhaustive enum;
//!    adding a type forces every registry and migration chain to handle it.
//!
//! 4. **No I/O in the core.** File verification is performed by callers
//!    and fed back as [`FileVerifications`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rdf-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod digest;
pub mod document;
pub mod error;
pub mod files;
pub mod note;
pub mod path;
pub mod resource;
pub mod severity;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use config::{EngineConfig, FutureVersionPolicy};
pub use digest::Sha256Digest;
pub use document::RawDocument;
pub use error::{ConfigurationError, DiscriminatorError, DocumentError};
pub use files::{FileReference, FileVerifications, VerificationResult};
pub use note::MigrationNote;
pub use path::{FieldPath, PathSegment};
pub use resource::ResourceTypeId;
pub use severity::Severity;
pub use version::{VersionParseError, VersionTag};
