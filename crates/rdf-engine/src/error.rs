//! # Load Errors
//!
//! Fail-fast outcomes of [`crate::Engine::load`]. Each variant wraps the
//! error of the stage that stopped the pipeline; everything that does not
//! stop it is reported as a validation entry instead.
//!
//! | Stage           | Error                   |
//! |-----------------|-------------------------|
//! | discriminate    | [`DiscriminatorError`]  |
//! | migrate         | [`MigrationError`]      |
//! | materialize     | [`MaterializationError`]|
//! | resolve shapes  | [`ShapeError`]          |
//! | validate        | [`SchemaLookupError`]   |

use rdf_core::{DiscriminatorError, ResourceTypeId};
use rdf_migrate::MigrationError;
use rdf_schema::{MaterializationError, SchemaLookupError};
use rdf_shape::ShapeError;
use thiserror::Error;

/// A document could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// `type` or `format_version` is missing, unknown, or rejected.
    #[error(transparent)]
    Discriminator(#[from] DiscriminatorError),

    /// A migration step produced an unusable document.
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// The migrated document does not fit the latest schema.
    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    /// The tensor axes of a model cannot be resolved.
    #[error("{resource_type} tensor shapes cannot be resolved: {source}")]
    Shape {
        /// Resource type of the description.
        resource_type: ResourceTypeId,
        /// The resolver failure.
        #[source]
        source: ShapeError,
    },

    /// The registry has no schema for a materialized description.
    #[error(transparent)]
    Lookup(#[from] SchemaLookupError),
}

impl LoadError {
    /// Short machine-readable name of the failing stage.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Discriminator(_) => "discriminate",
            Self::Migration(_) => "migrate",
            Self::Materialization(_) => "materialize",
            Self::Shape { .. } => "resolve_shapes",
            Self::Lookup(_) => "validate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_shape::AxisKey;

    #[test]
    fn shape_errors_name_the_type() {
        let err = LoadError::Shape {
            resource_type: ResourceTypeId::Model,
            source: ShapeError::DuplicateAxis(AxisKey::new("raw", "x")),
        };
        assert_eq!(
            err.to_string(),
            "model tensor shapes cannot be resolved: axis raw.x is declared more than once"
        );
        assert_eq!(err.stage(), "resolve_shapes");
    }

    #[test]
    fn discriminator_errors_pass_through() {
        let inner = DiscriminatorError::UnknownType { found: None };
        let message = inner.to_string();
        let err = LoadError::from(inner);
        assert_eq!(err.to_string(), message);
        assert_eq!(err.stage(), "discriminate");
    }
}
