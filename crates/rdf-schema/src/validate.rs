//! # Validation
//!
//! Runs every semantic check over a materialized description and collects
//! the findings into a [`ValidationSummary`].
//!
//! ## Order of Checks
//!
//! 1. Field validators, walking the schema in declaration order and
//!    descending into objects, list items, map values and the matching arm
//!    of each union.
//! 2. Unknown top-level fields, at the configured severity.
//! 3. Migration notes, at the configured severity.
//! 4. Cross-field checks ([`crate::cross`]).
//! 5. File verification outcomes, when supplied.
//!
//! No step short-circuits: a description with a broken `name` still has its
//! tensors, weights and files checked.

use rdf_core::{EngineConfig, FieldPath, FileVerifications, MigrationNote};
use rdf_shape::ResolvedShapes;
use serde_yaml::Value;

use crate::cross;
use crate::registry::{SchemaLookupError, SchemaRegistry};
use crate::schema::{FieldSpec, ValueShape};
use crate::summary::{SummaryBuilder, ValidationSummary};
use crate::typed::TypedDescription;

/// Inputs to validation beyond the description itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Engine settings.
    pub config: &'a EngineConfig,
    /// Resolved tensor shapes (models only).
    pub shapes: Option<&'a ResolvedShapes>,
    /// Outcomes of caller-side file verification.
    pub files: Option<&'a FileVerifications>,
    /// Notes recorded while upgrading the document.
    pub notes: &'a [MigrationNote],
}

impl<'a> ValidationContext<'a> {
    /// A context with nothing but the configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            shapes: None,
            files: None,
            notes: &[],
        }
    }

    /// Attach resolved shapes.
    pub fn with_shapes(mut self, shapes: &'a ResolvedShapes) -> Self {
        self.shapes = Some(shapes);
        self
    }

    /// Attach file verification outcomes.
    pub fn with_files(mut self, files: &'a FileVerifications) -> Self {
        self.files = Some(files);
        self
    }

    /// Attach migration notes.
    pub fn with_notes(mut self, notes: &'a [MigrationNote]) -> Self {
        self.notes = notes;
        self
    }
}

/// Validate a description into a fresh summary.
pub fn validate(
    registry: &SchemaRegistry,
    description: &TypedDescription,
    ctx: &ValidationContext<'_>,
) -> Result<ValidationSummary, SchemaLookupError> {
    let mut out = SummaryBuilder::new();
    validate_into(registry, description, ctx, &mut out)?;
    Ok(out.finish())
}

/// Validate a description, appending to an existing builder.
pub fn validate_into(
    registry: &SchemaRegistry,
    description: &TypedDescription,
    ctx: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) -> Result<(), SchemaLookupError> {
    let schema = registry.lookup(description.resource_type(), description.schema_version())?;
    let doc = description.source_document();
    let before = out.len();

    // 1. Field validators.
    for spec in schema.fields() {
        if let Some(value) = doc.get(spec.name) {
            walk_field(spec, value, &FieldPath::field(spec.name), ctx, out);
        }
    }

    // 2. Unknown top-level fields.
    for key in doc.keys() {
        if !schema.declares(key) {
            out.push(
                ctx.config.unknown_fields,
                FieldPath::field(key),
                format!("unknown field {key:?} for {}", schema.resource_type()),
            );
        }
    }

    // 3. Migration notes.
    for note in ctx.notes {
        out.push(
            ctx.config.migration_notes,
            note.field.clone(),
            format!("{} -> {}: {}", note.from, note.to, note.message),
        );
    }

    // 4. Cross-field checks.
    cross::check(description, ctx, out);

    // 5. Files.
    if let Some(files) = ctx.files {
        cross::check_files(files, out);
    }

    tracing::debug!(
        resource_type = %description.resource_type(),
        entries = out.len() - before,
        "validated description"
    );
    Ok(())
}

fn walk_field(
    spec: &FieldSpec,
    value: &Value,
    path: &FieldPath,
    ctx: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    if value.is_null() {
        return;
    }
    if let Some(validator) = spec.validator {
        validator(value, path, ctx, out);
    }
    walk_shape(&spec.shape, value, path, ctx, out);
}

fn walk_shape(
    shape: &ValueShape,
    value: &Value,
    path: &FieldPath,
    ctx: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let value = rdf_core::document::untagged(value);
    match (shape, value) {
        (ValueShape::Object(fields), Value::Mapping(map)) => {
            for spec in fields {
                if let Some(child) = map.get(spec.name) {
                    walk_field(spec, child, &path.key(spec.name), ctx, out);
                }
            }
        }
        (ValueShape::List(item), Value::Sequence(items)) => {
            for (i, child) in items.iter().enumerate() {
                walk_shape(item, child, &path.index(i), ctx, out);
            }
        }
        (ValueShape::Map(inner), Value::Mapping(map)) => {
            for (key, child) in map {
                if let Some(key) = key.as_str() {
                    walk_shape(inner, child, &path.key(key), ctx, out);
                }
            }
        }
        (ValueShape::Union(_), v) => {
            if let Some(arm) = shape.matching_arm(v) {
                walk_shape(&arm.shape, v, path, ctx, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::summary::Status;
    use rdf_core::{RawDocument, ResourceTypeId, Severity, VersionTag};

    fn load(registry: &SchemaRegistry, yaml: &str) -> TypedDescription {
        let doc = RawDocument::from_yaml_str(yaml).unwrap();
        let version = VersionTag::from_value(doc.get("format_version").unwrap()).unwrap();
        let resource_type = ResourceTypeId::from_type_literal(doc.get_str("type").unwrap()).unwrap();
        let schema = registry.lookup(resource_type, version).unwrap();
        materialize(doc, schema).unwrap()
    }

    #[test]
    fn clean_dataset_passes() {
        let registry = SchemaRegistry::standard().unwrap();
        let typed = load(
            &registry,
            "format_version: 0.3.0\ntype: dataset\nname: cells\ndescription: images of cells\nlicense: CC-BY-4.0\n",
        );
        let config = EngineConfig::default();
        let summary = validate(&registry, &typed, &ValidationContext::new(&config)).unwrap();
        assert_eq!(summary.status(), Status::Passed, "{summary}");
    }

    #[test]
    fn nested_validators_run() {
        let registry = SchemaRegistry::standard().unwrap();
        let typed = load(
            &registry,
            "format_version: 0.3.0\ntype: generic\nname: n\ndescription: d\nauthors:\n  - {name: Jane, email: not-an-email}\n  - {name: Joe, orcid: 0000-0002-1825-0098}\n",
        );
        let config = EngineConfig::default();
        let summary = validate(&registry, &typed, &ValidationContext::new(&config)).unwrap();
        let locs: Vec<String> = summary
            .with_severity(Severity::Error)
            .map(|e| e.loc.to_string())
            .collect();
        assert_eq!(locs, vec!["authors[0].email", "authors[1].orcid"]);
    }

    #[test]
    fn unknown_fields_use_configured_severity() {
        let registry = SchemaRegistry::standard().unwrap();
        let typed = load(
            &registry,
            "format_version: 0.3.0\ntype: generic\nname: n\ndescription: d\nflavour: mint\n",
        );
        let config = EngineConfig::default();
        let summary = validate(&registry, &typed, &ValidationContext::new(&config)).unwrap();
        assert_eq!(summary.status(), Status::ValidWithWarnings);
        assert_eq!(summary.entries()[0].loc.to_string(), "flavour");

        let strict = EngineConfig {
            unknown_fields: Severity::Error,
            ..EngineConfig::default()
        };
        let summary = validate(&registry, &typed, &ValidationContext::new(&strict)).unwrap();
        assert_eq!(summary.status(), Status::Failed);
    }

    #[test]
    fn migration_notes_are_reported() {
        let registry = SchemaRegistry::standard().unwrap();
        let typed = load(
            &registry,
            "format_version: 0.3.0\ntype: generic\nname: n\ndescription: d\n",
        );
        let notes = vec![MigrationNote {
            from: VersionTag::new(0, 2, 3),
            to: VersionTag::new(0, 3, 0),
            field: FieldPath::field("download_url"),
            message: "dropped".to_string(),
        }];
        let config = EngineConfig {
            migration_notes: Severity::Info,
            ..EngineConfig::default()
        };
        let ctx = ValidationContext::new(&config).with_notes(&notes);
        let summary = validate(&registry, &typed, &ctx).unwrap();
        assert_eq!(summary.status(), Status::Passed);
        assert_eq!(summary.entries()[0].msg, "0.2.3 -> 0.3.0: dropped");
    }

    #[test]
    fn broken_fields_each_yield_an_error() {
        let registry = SchemaRegistry::standard().unwrap();
        let typed = load(
            &registry,
            "format_version: 0.3.0\ntype: generic\nname: a/b\ndescription: ' '\ndocumentation: README.txt\ngit_repo: github.com/x\nversion: one\n",
        );
        let config = EngineConfig::default();
        let summary = validate(&registry, &typed, &ValidationContext::new(&config)).unwrap();
        assert!(summary.error_count() >= 5, "{summary}");
    }
}
