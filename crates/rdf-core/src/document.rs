//! # Raw Documents
//!
//! `RawDocument` is the untyped, ordered mapping produced by the document
//! loader and consumed by the discriminator, the migration engine, and
//! materialization.
//!
//! ## Invariants
//!
//! - Top-level keys are strings; nested mappings may use any key type.
//! - Insertion order is preserved (the backing `serde_yaml::Mapping` is
//!   index-ordered), so a re-serialized document keeps its field order.
//! - There is no mutation API. Transforms work on an owned copy obtained
//!   through [`RawDocument::to_mapping`] and produce a new document.
//!
//! ## Literal Grammar
//!
//! Loading uses the full YAML 1.2 core schema of `serde_yaml`, so `.inf`,
//! `-.inf` and `.nan` parse as floats. Older model documents rely on these
//! for unbounded data ranges.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::DocumentError;

/// An untyped resource description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawDocument(Mapping);

impl RawDocument {
    /// Wrap a mapping, rejecting non-string top-level keys.
    pub fn from_mapping(mapping: Mapping) -> Result<Self, DocumentError> {
        if let Some(bad) = mapping.keys().find(|k| !k.is_string()) {
            return Err(DocumentError::NonStringKey(format!("{bad:?}")));
        }
        Ok(Self(mapping))
    }

    /// Wrap a value whose root must be a mapping.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Mapping(mapping) => Self::from_mapping(mapping),
            Value::Tagged(tagged) => Self::from_value(tagged.value),
            other => Err(DocumentError::NotAMapping(kind_name(&other))),
        }
    }

    /// Parse YAML (or JSON, a YAML subset) text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    /// Serialize back to YAML text.
    pub fn to_yaml_string(&self) -> Result<String, DocumentError> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether a top-level field is present (even if null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Clone the underlying mapping for editing.
    pub fn to_mapping(&self) -> Mapping {
        self.0.clone()
    }

    /// Consume the document, returning the underlying mapping.
    pub fn into_mapping(self) -> Mapping {
        self.0
    }

    /// Clone the document as a `Value::Mapping`.
    pub fn to_value(&self) -> Value {
        Value::Mapping(self.0.clone())
    }
}

/// Human-readable name of a YAML value's kind, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Strip YAML tags, returning the innermost value.
pub fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}
