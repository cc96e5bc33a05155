//! # Error Types — Fail-Fast Error Hierarchy
//!
//! Defines the errors that abort processing of a document or prevent the
//! engine from starting. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors describe an incomplete or inconsistent registry
//!   or migration chain. They are raised while the engine is being built,
//!   never while a document is processed.
//! - Discriminator errors reject a document before any migration runs.
//! - Semantic problems are *not* errors: they are accumulated as
//!   validation entries by `rdf-schema`.

use thiserror::Error;

use crate::resource::ResourceTypeId;
use crate::version::VersionTag;

/// The schema registry or migration chain is incomplete or inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two schemas were registered under the same (type, version) key.
    #[error("duplicate schema registered for {resource_type} {version}")]
    DuplicateSchema {
        /// Resource type of the conflicting registration.
        resource_type: ResourceTypeId,
        /// Format version of the conflicting registration.
        version: VersionTag,
    },

    /// A resource type has no registered schema at all.
    #[error("no schema registered for resource type {0}")]
    MissingResourceType(ResourceTypeId),

    /// Two migration steps share the same source version.
    #[error("duplicate migration step for {resource_type} from {from}")]
    DuplicateStep {
        /// Resource type of the chain.
        resource_type: ResourceTypeId,
        /// Source version shared by both steps.
        from: VersionTag,
    },

    /// A registered version below latest has no outgoing migration step.
    #[error("missing migration step for {resource_type} from {from}")]
    MissingStep {
        /// Resource type of the chain.
        resource_type: ResourceTypeId,
        /// Registered version without a step.
        from: VersionTag,
    },

    /// A migration step starts or ends at a version the registry does not know.
    #[error("migration step for {resource_type} {from} -> {to} references an unregistered version")]
    StepVersionUnknown {
        /// Resource type of the chain.
        resource_type: ResourceTypeId,
        /// Step source version.
        from: VersionTag,
        /// Step target version.
        to: VersionTag,
    },

    /// A migration step does not move the document forward.
    #[error("migration step for {resource_type} {from} -> {to} does not advance the version")]
    NonAdvancingStep {
        /// Resource type of the chain.
        resource_type: ResourceTypeId,
        /// Step source version.
        from: VersionTag,
        /// Step target version.
        to: VersionTag,
    },

    /// Engine configuration values are inconsistent.
    #[error("invalid engine configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// The document's `type` or `format_version` could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorError {
    /// `type` is absent, not a string, or not a recognized resource type.
    #[error("unknown resource type: {}", .found.as_deref().unwrap_or("<missing>"))]
    UnknownType {
        /// The raw `type` value, if one was present.
        found: Option<String>,
    },

    /// `format_version` is absent or cannot be parsed as a version tag.
    #[error("unknown format version: {}", .found.as_deref().unwrap_or("<missing>"))]
    UnknownVersion {
        /// The raw `format_version` value, if one was present.
        found: Option<String>,
    },

    /// The version parses but no schema family can handle it.
    #[error("format version {version} is not supported for resource type {resource_type}")]
    UnsupportedVersion {
        /// Resource type of the document.
        resource_type: ResourceTypeId,
        /// Declared format version.
        version: VersionTag,
    },

    /// The version is newer than the latest known and the engine is
    /// configured to reject such documents.
    #[error("format version {version} is newer than the latest known {latest} for {resource_type}")]
    FutureVersionRejected {
        /// Resource type of the document.
        resource_type: ResourceTypeId,
        /// Declared format version.
        version: VersionTag,
        /// Latest registered version.
        latest: VersionTag,
    },
}

/// A document could not be turned into a [`crate::RawDocument`].
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input is not valid YAML (or JSON), or could not be serialized.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document root is not a mapping.
    #[error("document root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// A top-level key is not a string.
    #[error("document keys must be strings, found {0}")]
    NonStringKey(String),
}
