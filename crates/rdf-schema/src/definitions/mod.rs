//! # Built-in Schema Definitions
//!
//! Field sets for every registered (resource type, format version).
//!
//! | Types                                   | Versions                                  |
//! |-----------------------------------------|-------------------------------------------|
//! | generic, dataset, application, notebook | 0.2.0 – 0.2.3, 0.3.0                      |
//! | collection                              | 0.2.0 – 0.2.3, 0.3.0                      |
//! | model                                   | 0.3.0 – 0.3.6, 0.4.0 – 0.4.10, 0.5.0 – 0.5.3 |
//!
//! Older versions only carry structure; field validators are attached to
//! the latest version of each type, the only one that is ever validated.

pub mod collection;
pub mod generic;
pub mod model;

use rdf_core::{ResourceTypeId, VersionTag};
use serde_yaml::Value;

use crate::checks;
use crate::schema::{FieldSpec, SchemaDescr, StrFormat, ValueShape};

const fn v(major: u32, minor: u32, patch: u32) -> VersionTag {
    VersionTag::new(major, minor, patch)
}

/// Registered versions of generic-family types and collections.
pub const GENERIC_VERSIONS: [VersionTag; 5] =
    [v(0, 2, 0), v(0, 2, 1), v(0, 2, 2), v(0, 2, 3), v(0, 3, 0)];

/// Registered model versions.
pub const MODEL_VERSIONS: [VersionTag; 22] = [
    v(0, 3, 0),
    v(0, 3, 1),
    v(0, 3, 2),
    v(0, 3, 3),
    v(0, 3, 4),
    v(0, 3, 5),
    v(0, 3, 6),
    v(0, 4, 0),
    v(0, 4, 1),
    v(0, 4, 2),
    v(0, 4, 3),
    v(0, 4, 4),
    v(0, 4, 5),
    v(0, 4, 6),
    v(0, 4, 7),
    v(0, 4, 8),
    v(0, 4, 9),
    v(0, 4, 10),
    v(0, 5, 0),
    v(0, 5, 1),
    v(0, 5, 2),
    v(0, 5, 3),
];

/// The version with a typed description, per resource type.
pub fn typed_version(resource_type: ResourceTypeId) -> VersionTag {
    match resource_type {
        ResourceTypeId::Model => v(0, 5, 3),
        _ => v(0, 3, 0),
    }
}

/// Every built-in schema.
pub fn standard_schemas() -> Vec<SchemaDescr> {
    let mut schemas = Vec::new();
    for resource_type in [
        ResourceTypeId::Generic,
        ResourceTypeId::Dataset,
        ResourceTypeId::Application,
        ResourceTypeId::Notebook,
    ] {
        for version in GENERIC_VERSIONS {
            schemas.push(generic::schema(resource_type, version));
        }
    }
    for version in GENERIC_VERSIONS {
        schemas.push(collection::schema(version));
    }
    for version in MODEL_VERSIONS {
        schemas.push(model::schema(version));
    }
    schemas
}

// ─── Shared shapes ──────────────────────────────────────────────────

pub(crate) fn empty_list() -> Value {
    Value::Sequence(Vec::new())
}

/// Person fields at the latest generic format.
pub(crate) fn author() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("name", ValueShape::string()).validated(checks::person_name),
        FieldSpec::optional("affiliation", ValueShape::string()),
        FieldSpec::optional("email", ValueShape::string()).validated(checks::email),
        FieldSpec::optional("github_user", ValueShape::string()).validated(checks::github_user),
        FieldSpec::optional("orcid", ValueShape::string()).validated(checks::orcid),
    ])
}

pub(crate) fn maintainer() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("github_user", ValueShape::string()).validated(checks::github_user),
        FieldSpec::optional("name", ValueShape::string()).validated(checks::person_name),
        FieldSpec::optional("affiliation", ValueShape::string()),
        FieldSpec::optional("email", ValueShape::string()).validated(checks::email),
        FieldSpec::optional("orcid", ValueShape::string()).validated(checks::orcid),
    ])
}

pub(crate) fn cite_entry() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("text", ValueShape::string()),
        FieldSpec::optional("doi", ValueShape::string()).validated(checks::doi),
        FieldSpec::optional("url", ValueShape::string()).validated(checks::url),
    ])
}

pub(crate) fn badge() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("label", ValueShape::string()),
        FieldSpec::optional("icon", ValueShape::string()),
        FieldSpec::required("url", ValueShape::string()).validated(checks::url),
    ])
}

pub(crate) fn file_descr() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("source", ValueShape::file_source()),
        FieldSpec::optional("sha256", ValueShape::Str(StrFormat::Sha256)),
    ])
}

pub(crate) fn linked_resource() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("id", ValueShape::string()).validated(checks::resource_id),
        FieldSpec::optional("version", ValueShape::string()),
    ])
}

/// Mark the named fields as required.
pub(crate) fn require(mut fields: Vec<FieldSpec>, names: &[&str]) -> Vec<FieldSpec> {
    for field in &mut fields {
        if names.contains(&field.name) {
            field.required = true;
        }
    }
    fields
}

/// Replace fields by name, appending those not present yet.
pub(crate) fn override_fields(mut fields: Vec<FieldSpec>, overrides: Vec<FieldSpec>) -> Vec<FieldSpec> {
    for spec in overrides {
        match fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => fields.push(spec),
        }
    }
    fields
}
