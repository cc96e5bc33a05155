//! # Engine Configuration
//!
//! Settings fixed when the engine is built. Loaded from YAML by the CLI
//! (`--config`); every field has a default so an empty file is valid.
//!
//! ```yaml
//! future_versions: accept      # or: reject
//! unknown_fields: warning      # info | warning | error
//! migration_notes: warning     # info | warning
//! max_description_length: 1024
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::severity::Severity;

/// How to treat a `format_version` newer than the latest registered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FutureVersionPolicy {
    /// Validate against the latest known schema and record a warning.
    #[default]
    Accept,
    /// Reject the document before migration.
    Reject,
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Handling of documents newer than the registry.
    pub future_versions: FutureVersionPolicy,
    /// Severity for top-level fields the latest schema does not declare.
    pub unknown_fields: Severity,
    /// Severity for notes emitted by migration steps (e.g. dropped fields).
    pub migration_notes: Severity,
    /// Descriptions longer than this produce a warning.
    pub max_description_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            future_versions: FutureVersionPolicy::Accept,
            unknown_fields: Severity::Warning,
            migration_notes: Severity::Warning,
            max_description_length: 1024,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// List inconsistent settings. Empty means the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_description_length == 0 {
            errors.push("max_description_length must be greater than zero".to_string());
        }
        if self.migration_notes == Severity::Error {
            errors.push(
                "migration_notes cannot be error: migration steps are total for valid input"
                    .to_string(),
            );
        }
        errors
    }

    /// Validate, converting problems into a [`ConfigurationError`].
    pub fn ensure_valid(&self) -> Result<(), ConfigurationError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::Invalid(errors))
        }
    }
}
