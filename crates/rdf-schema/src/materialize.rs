//! # Materialization
//!
//! Turns a migrated [`RawDocument`] into a [`TypedDescription`].
//!
//! ## Algorithm
//!
//! 1. Structural conformance against the schema ([`SchemaDescr::conform`]).
//!    All violations are collected; any violation aborts with
//!    [`MaterializationError::Structure`].
//! 2. The normalized value (defaults filled in, null optionals removed) is
//!    deserialized into the typed struct of the resource type. Tagged
//!    unions resolve to their first matching arm, mirroring step 1.
//!
//! Only the latest schema of each type has a typed form.

use rdf_core::{RawDocument, ResourceTypeId, VersionTag};
use serde_yaml::Value;
use thiserror::Error;

use crate::definitions::typed_version;
use crate::schema::{SchemaDescr, StructuralViolations};
use crate::typed::collection::{CollectionDescr, CollectionFields};
use crate::typed::model::{ModelDescr, ModelFields};
use crate::typed::{DescriptionContent, GenericDescr, TypedDescription};

/// A migrated document does not fit its schema.
#[derive(Error, Debug)]
pub enum MaterializationError {
    /// One or more values have the wrong shape or required fields are missing.
    #[error("document does not match the {resource_type} {version} schema:\n{violations}")]
    Structure {
        /// Resource type of the schema.
        resource_type: ResourceTypeId,
        /// Version of the schema.
        version: VersionTag,
        /// Every violation found.
        violations: StructuralViolations,
    },

    /// The schema is not the latest of its type and has no typed form.
    #[error("no typed description exists for {resource_type} {version}; upgrade the document first")]
    NoTypedForm {
        /// Resource type of the schema.
        resource_type: ResourceTypeId,
        /// Version of the schema.
        version: VersionTag,
    },

    /// The conforming document could not be read into the typed struct.
    #[error("cannot read {resource_type} {version} description: {source}")]
    Typed {
        /// Resource type of the schema.
        resource_type: ResourceTypeId,
        /// Version of the schema.
        version: VersionTag,
        /// Deserialization failure.
        #[source]
        source: serde_yaml::Error,
    },
}

impl MaterializationError {
    /// Structural violations, if this is a structure error.
    pub fn violations(&self) -> Option<&StructuralViolations> {
        match self {
            Self::Structure { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// Materialize a document against the latest schema of its type.
pub fn materialize(
    doc: RawDocument,
    schema: &SchemaDescr,
) -> Result<TypedDescription, MaterializationError> {
    let resource_type = schema.resource_type();
    let version = schema.version();
    if typed_version(resource_type) != version {
        return Err(MaterializationError::NoTypedForm {
            resource_type,
            version,
        });
    }

    let normalized = schema
        .conform(&doc)
        .map_err(|violations| MaterializationError::Structure {
            resource_type,
            version,
            violations,
        })?;

    let typed_err = |source| MaterializationError::Typed {
        resource_type,
        version,
        source,
    };
    let generic: GenericDescr = serde_yaml::from_value(normalized.clone()).map_err(typed_err)?;
    let content = match resource_type {
        ResourceTypeId::Generic => DescriptionContent::Generic(generic),
        ResourceTypeId::Dataset => DescriptionContent::Dataset(generic),
        ResourceTypeId::Application => DescriptionContent::Application(generic),
        ResourceTypeId::Notebook => DescriptionContent::Notebook(generic),
        ResourceTypeId::Collection => {
            let fields: CollectionFields = from_normalized(normalized).map_err(typed_err)?;
            DescriptionContent::Collection(CollectionDescr::from_parts(generic, fields))
        }
        ResourceTypeId::Model => {
            let fields: ModelFields = from_normalized(normalized).map_err(typed_err)?;
            DescriptionContent::Model(Box::new(ModelDescr::from_parts(generic, fields)))
        }
    };

    tracing::debug!(%resource_type, %version, "materialized description");
    Ok(TypedDescription::new(version, content, doc))
}

fn from_normalized<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, serde_yaml::Error> {
    serde_yaml::from_value(value)
}
