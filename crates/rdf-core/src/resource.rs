//! # Resource Type Identifiers
//!
//! The closed set of resource types a document can declare in its `type`
//! field. Each type selects one schema family in the registry and one
//! migration chain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource type declared by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTypeId {
    /// Generic resource; the fallback for `generic` and `rdf`.
    Generic,
    /// A trained model with tensor and weight descriptions.
    Model,
    /// A dataset.
    Dataset,
    /// An application (tool, plugin, web app).
    Application,
    /// A notebook.
    Notebook,
    /// A collection of other resources.
    Collection,
}

impl ResourceTypeId {
    /// Every resource type, in registry order.
    pub const ALL: [ResourceTypeId; 6] = [
        Self::Generic,
        Self::Model,
        Self::Dataset,
        Self::Application,
        Self::Notebook,
        Self::Collection,
    ];

    /// Resolve the `type` literal of a document.
    ///
    /// Matching is exact and case-sensitive. `rdf` is accepted as a legacy
    /// spelling of the generic type.
    pub fn from_type_literal(literal: &str) -> Option<Self> {
        match literal {
            "generic" | "rdf" => Some(Self::Generic),
            "model" => Some(Self::Model),
            "dataset" => Some(Self::Dataset),
            "application" => Some(Self::Application),
            "notebook" => Some(Self::Notebook),
            "collection" => Some(Self::Collection),
            _ => None,
        }
    }

    /// The canonical `type` literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Model => "model",
            Self::Dataset => "dataset",
            Self::Application => "application",
            Self::Notebook => "notebook",
            Self::Collection => "collection",
        }
    }

    /// Whether documents of this type carry tensor descriptions.
    pub fn has_tensors(&self) -> bool {
        matches!(self, Self::Model)
    }
}

impl fmt::Display for ResourceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
