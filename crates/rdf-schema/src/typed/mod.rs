//! # Typed Descriptions
//!
//! Immutable, typed views of documents at the latest format version of
//! their resource type. Produced only by [`crate::materialize`].
//!
//! ## Design
//!
//! One struct per resource family, gathered in the [`DescriptionContent`]
//! enum. Dataset, application and notebook descriptions share
//! [`GenericDescr`]; collections and models embed it and add their own
//! fields. There is no inheritance between versions: only the latest
//! version of each type has a typed form.

pub mod collection;
pub mod file;
pub mod generic;
pub mod model;

use rdf_core::{RawDocument, ResourceTypeId, VersionTag};
use serde::Serialize;

pub use collection::{CollectionDescr, CollectionEntry};
pub use file::{FileDescr, FileSource, InvalidFileSource};
pub use generic::{Author, Badge, CiteEntry, GenericDescr, LinkedResource, Maintainer};
pub use model::{
    ArchitectureDescr, AxisDescr, AxisSize, BatchAxis, ChannelAxis, IndexAxis, ModelDescr,
    ProcessingDescr, RunMode, SpatialAxis, TensorData, TensorDescr, TimeAxis, WeightsDescr,
    WeightsEntry, WeightsFormat,
};

/// Content of a typed description, one variant per resource type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DescriptionContent {
    /// Generic resource.
    Generic(GenericDescr),
    /// Dataset.
    Dataset(GenericDescr),
    /// Application.
    Application(GenericDescr),
    /// Notebook.
    Notebook(GenericDescr),
    /// Collection.
    Collection(CollectionDescr),
    /// Model.
    Model(Box<ModelDescr>),
}

impl DescriptionContent {
    /// Generic fields of any variant.
    pub fn generic(&self) -> &GenericDescr {
        match self {
            Self::Generic(g) | Self::Dataset(g) | Self::Application(g) | Self::Notebook(g) => g,
            Self::Collection(c) => &c.generic,
            Self::Model(m) => &m.generic,
        }
    }

    /// Resource type of the variant.
    pub fn resource_type(&self) -> ResourceTypeId {
        match self {
            Self::Generic(_) => ResourceTypeId::Generic,
            Self::Dataset(_) => ResourceTypeId::Dataset,
            Self::Application(_) => ResourceTypeId::Application,
            Self::Notebook(_) => ResourceTypeId::Notebook,
            Self::Collection(_) => ResourceTypeId::Collection,
            Self::Model(_) => ResourceTypeId::Model,
        }
    }
}

/// A materialized description together with the document it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDescription {
    schema_version: VersionTag,
    content: DescriptionContent,
    source: RawDocument,
}

impl TypedDescription {
    pub(crate) fn new(
        schema_version: VersionTag,
        content: DescriptionContent,
        source: RawDocument,
    ) -> Self {
        Self {
            schema_version,
            content,
            source,
        }
    }

    /// Resource type.
    pub fn resource_type(&self) -> ResourceTypeId {
        self.content.resource_type()
    }

    /// Registered version whose schema this description was checked against.
    pub fn schema_version(&self) -> VersionTag {
        self.schema_version
    }

    /// Typed content.
    pub fn content(&self) -> &DescriptionContent {
        &self.content
    }

    /// Generic fields.
    pub fn generic(&self) -> &GenericDescr {
        self.content.generic()
    }

    /// Model content, if this is a model.
    pub fn as_model(&self) -> Option<&ModelDescr> {
        match &self.content {
            DescriptionContent::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Collection content, if this is a collection.
    pub fn as_collection(&self) -> Option<&CollectionDescr> {
        match &self.content {
            DescriptionContent::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// The (migrated) document this description was materialized from.
    pub fn source_document(&self) -> &RawDocument {
        &self.source
    }
}
