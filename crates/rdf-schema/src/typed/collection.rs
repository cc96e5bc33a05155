//! Collection description (format 0.3.0).

use serde::{Deserialize, Serialize};

use super::file::FileSource;
use super::generic::GenericDescr;

/// One member of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Member id, unique within the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Description file of the member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSource>,
    /// Resource type of the member.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionFields {
    #[serde(default)]
    pub collection: Vec<CollectionEntry>,
}

/// A collection of other resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDescr {
    /// Generic fields.
    #[serde(flatten)]
    pub generic: GenericDescr,
    /// Members in declaration order.
    pub collection: Vec<CollectionEntry>,
}

impl CollectionDescr {
    pub(crate) fn from_parts(generic: GenericDescr, fields: CollectionFields) -> Self {
        Self {
            generic,
            collection: fields.collection,
        }
    }
}
