//! # Engine
//!
//! Owns the frozen schema registry and migration chains and runs the load
//! pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! RawDocument
//!   → discriminator::resolve        (type, declared version)
//!   → VersionIndex::admit           (patch fallback, future-version policy)
//!   → MigrationEngine::upgrade      (step by step to latest)
//!   → materialize                   (latest schema → TypedDescription)
//!   → resolve_shapes                (models with unique tensor and axis ids)
//!   → validate                      (field, unknown-field, note, cross-field, file entries)
//!   → LoadOutcome
//! ```
//!
//! Every stage before validation is fail-fast and returns a [`LoadError`].
//! Validation accumulates entries and never fails on document content.
//! A model with repeated tensor or axis ids skips shape resolution, so the
//! repeats surface as validation entries and the halo check is skipped.
//!
//! ## Sharing
//!
//! Nothing is mutated after [`Engine::new`]; an `Engine` is `Send + Sync`
//! and meant to be built once and shared by reference.

use rdf_core::{
    ConfigurationError, EngineConfig, FieldPath, FileReference, FileVerifications, RawDocument,
    ResourceTypeId,
};
use rdf_migrate::{AppliedStep, MigrationEngine, UpgradeReport};
use rdf_schema::{
    discriminator, materialize, required_files, validate_into, Admission, SchemaRegistry,
    SummaryBuilder, TypedDescription, ValidationContext, ValidationSummary,
};
use rdf_shape::{first_duplicate_id, resolve_shapes, ResolvedShapes};

use crate::error::LoadError;

/// Everything a successful load produces.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The description, materialized against the latest schema.
    pub description: TypedDescription,
    /// Accumulated findings.
    pub summary: ValidationSummary,
    /// Migration steps applied and notes recorded.
    pub report: UpgradeReport,
    /// Resolved tensor axis sizes, for models whose tensor and axis ids are
    /// unique.
    pub shapes: Option<ResolvedShapes>,
}

impl LoadOutcome {
    /// Whether the summary has no error entries.
    pub fn is_valid(&self) -> bool {
        self.summary.is_valid()
    }
}

/// The validation engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    registry: SchemaRegistry,
    migrations: MigrationEngine,
}

impl Engine {
    /// Check `config`, build the registry and the migration chains.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        config.ensure_valid()?;
        let registry = SchemaRegistry::standard()?;
        let migrations = MigrationEngine::standard(&registry)?;
        tracing::debug!(schemas = registry.len(), "engine ready");
        Ok(Self {
            config,
            registry,
            migrations,
        })
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The migration chains.
    pub fn migrations(&self) -> &MigrationEngine {
        &self.migrations
    }

    /// Load and validate a document.
    pub fn load(&self, doc: &RawDocument) -> Result<LoadOutcome, LoadError> {
        self.run(doc, None)
    }

    /// Load and validate a document, including caller-supplied file
    /// verification outcomes in the summary.
    pub fn load_with_files(
        &self,
        doc: &RawDocument,
        files: &FileVerifications,
    ) -> Result<LoadOutcome, LoadError> {
        self.run(doc, Some(files))
    }

    /// Upgrade a document to the latest format without validating it.
    pub fn update_format(&self, doc: &RawDocument) -> Result<UpgradeReport, LoadError> {
        self.admit(doc)?;
        Ok(self.migrations.upgrade_with_report(doc)?)
    }

    /// Files a description refers to, for callers that verify them.
    pub fn required_files(&self, description: &TypedDescription) -> Vec<FileReference> {
        required_files(description)
    }

    /// Migration steps of one resource type, in chain order.
    pub fn changelog(&self, resource_type: ResourceTypeId) -> Vec<AppliedStep> {
        self.migrations.changelog(resource_type)
    }

    fn admit(&self, doc: &RawDocument) -> Result<Admission, LoadError> {
        let (resource_type, declared) = discriminator::resolve(doc)?;
        let admission = self.registry.version_index().admit(
            resource_type,
            declared,
            self.config.future_versions,
        )?;
        if admission.warning().is_some() {
            tracing::warn!(
                %resource_type,
                %declared,
                effective = %admission.effective,
                "format_version not registered; using fallback"
            );
        }
        Ok(admission)
    }

    fn run(
        &self,
        doc: &RawDocument,
        files: Option<&FileVerifications>,
    ) -> Result<LoadOutcome, LoadError> {
        let admission = self.admit(doc)?;
        let resource_type = admission.resource_type;

        let report = self.migrations.upgrade_with_report(doc)?;
        let schema = self.registry.latest_schema(resource_type)?;
        let description = materialize(report.document.clone(), schema)?;

        let shapes = match description.as_model() {
            Some(model) => {
                let tensors = model.tensor_shapes();
                match first_duplicate_id(&tensors) {
                    // Duplicates are reported as entries by validation.
                    Some(duplicate) => {
                        tracing::debug!(%duplicate, "duplicate tensor or axis id; shapes not resolved");
                        None
                    }
                    None => Some(resolve_shapes(&tensors).map_err(|source| {
                        LoadError::Shape {
                            resource_type,
                            source,
                        }
                    })?),
                }
            }
            None => None,
        };

        let mut out = SummaryBuilder::new();
        if let Some(message) = admission.warning() {
            out.warning(FieldPath::field("format_version"), message);
        }
        let mut ctx = ValidationContext::new(&self.config).with_notes(&report.notes);
        if let Some(shapes) = &shapes {
            ctx = ctx.with_shapes(shapes);
        }
        if let Some(files) = files {
            ctx = ctx.with_files(files);
        }
        validate_into(&self.registry, &description, &ctx, &mut out)?;
        let summary = out.finish();

        tracing::info!(
            %resource_type,
            declared = %admission.declared,
            schema = %description.schema_version(),
            steps = report.applied.len(),
            errors = summary.error_count(),
            warnings = summary.warning_count(),
            "loaded description"
        );
        Ok(LoadOutcome {
            description,
            summary,
            report,
            shapes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::{DiscriminatorError, FutureVersionPolicy, Severity};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn doc(yaml: &str) -> RawDocument {
        RawDocument::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let config = EngineConfig {
            max_description_length: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(ConfigurationError::Invalid(_))
        ));
    }

    #[test]
    fn minimal_dataset_is_valid() {
        let outcome = engine()
            .load(&doc("format_version: 0.3.0\ntype: dataset\nname: Cells\ndescription: Cell images.\n"))
            .unwrap();
        assert!(outcome.is_valid(), "{}", outcome.summary);
        assert!(outcome.report.is_unchanged());
        assert!(outcome.shapes.is_none());
    }

    #[test]
    fn missing_type_fails_fast() {
        let err = engine().load(&doc("format_version: 0.3.0\nname: x\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Discriminator(DiscriminatorError::UnknownType { found: None })
        ));
    }

    #[test]
    fn future_versions_follow_the_policy() {
        let future = doc("format_version: 0.3.7\ntype: dataset\nname: Cells\ndescription: Cell images.\n");
        let outcome = engine().load(&future).unwrap();
        let warnings: Vec<_> = outcome.summary.with_severity(Severity::Warning).collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].loc, FieldPath::field("format_version"));

        let strict = Engine::new(EngineConfig {
            future_versions: FutureVersionPolicy::Reject,
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(matches!(
            strict.load(&future),
            Err(LoadError::Discriminator(
                DiscriminatorError::FutureVersionRejected { .. }
            ))
        ));
    }

    #[test]
    fn structural_failures_report_every_violation() {
        let err = engine()
            .load(&doc("format_version: 0.3.0\ntype: dataset\nname: 3\ndescription: [x]\n"))
            .unwrap_err();
        let LoadError::Materialization(err) = err else {
            panic!("expected a materialization error, got {err:?}");
        };
        assert_eq!(err.violations().map(|v| v.len()), Some(2));
    }
}
