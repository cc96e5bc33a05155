//! # rdf-schema — Schemas, Materialization & Validation
//!
//! Everything that knows what a resource description of a given
//! (resource type, format version) looks like.
//!
//! ## Registry (`registry`, `definitions`)
//!
//! [`SchemaRegistry`] maps every registered (type, version) to its
//! [`SchemaDescr`]. It is built once, checked for completeness, and frozen.
//! [`VersionIndex`] classifies declared versions (exact, patch fallback,
//! future, unsupported) for both the registry and the migration engine.
//!
//! ## Materialization (`discriminator`, `materialize`, `typed`)
//!
//! [`discriminator::resolve`] reads `type` and `format_version`.
//! [`materialize`] checks a document against the latest schema of its type,
//! collecting every structural violation, and produces an immutable
//! [`TypedDescription`].
//!
//! ## Validation (`validate`, `checks`, `cross`, `summary`)
//!
//! [`validate`] runs field validators, unknown-field and migration-note
//! reporting, cross-field checks and file outcomes, accumulating
//! severity-leveled entries into a [`ValidationSummary`]. Validation never
//! aborts on the first finding.
//!
//! ## Crate Policy
//!
//! - Depends on `rdf-core` and `rdf-shape` only.
//! - No I/O. File checks consume caller-supplied [`rdf_core::FileVerifications`].

pub mod checks;
pub mod cross;
pub mod definitions;
pub mod discriminator;
pub mod files;
pub mod materialize;
pub mod registry;
pub mod schema;
pub mod summary;
pub mod typed;
pub mod validate;

pub use files::required_files;
pub use materialize::{materialize, MaterializationError};
pub use registry::{
    Admission, KnownVersion, RegistryBuilder, SchemaLookupError, SchemaRegistry, VersionIndex,
};
pub use schema::{
    FieldSpec, FieldValidator, SchemaDescr, StrFormat, StructuralViolation, StructuralViolations,
    UnionArm, ValueShape,
};
pub use summary::{Status, SummaryBuilder, ValidationEntry, ValidationSummary};
pub use typed::{DescriptionContent, TypedDescription};
pub use validate::{validate, validate_into, ValidationContext};
