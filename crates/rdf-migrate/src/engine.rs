//! # Migration Engine
//!
//! Chains [`MigrationStep`]s per resource type and upgrades documents to the
//! latest registered format version.
//!
//! ## Build-Time Checks
//!
//! [`MigrationEngine::build`] checks the steps against the schema registry
//! once, so that `upgrade` can never get stuck at run time:
//!
//! - both ends of every step are registered versions;
//! - every step moves forward;
//! - no two steps of a type share a source version;
//! - every registered version below latest has an outgoing step.
//!
//! ## Upgrade Loop
//!
//! ```text
//! v = admitted version of doc
//! while v < latest(type):
//!     step = steps[type][v]
//!     doc  = step(doc); doc.format_version = step.to
//!     v    = step.to
//! ```
//!
//! A document whose declared version is an unregistered patch starts from
//! the registered patch below it. A document newer than latest is returned
//! unchanged; whether to accept it is the caller's policy.

use std::collections::BTreeMap;

use rdf_core::{
    ConfigurationError, DiscriminatorError, DocumentError, FutureVersionPolicy, MigrationNote,
    RawDocument, ResourceTypeId, VersionTag,
};
use rdf_schema::{discriminator, SchemaRegistry, VersionIndex};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::chains;
use crate::step::{AppliedStep, MigrationStep};

/// A document could not be upgraded.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// `type` or `format_version` cannot be interpreted.
    #[error(transparent)]
    Discriminator(#[from] DiscriminatorError),

    /// A step produced a mapping that is not a valid document.
    #[error("migration {from} -> {to} produced an invalid document: {source}")]
    Document {
        /// Step source version.
        from: VersionTag,
        /// Step target version.
        to: VersionTag,
        /// Why the result was rejected.
        #[source]
        source: DocumentError,
    },
}

/// Result of an upgrade with everything that happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeReport {
    /// The upgraded document.
    pub document: RawDocument,
    /// Steps applied, in order.
    pub applied: Vec<AppliedStep>,
    /// Information that could not be carried forward.
    pub notes: Vec<MigrationNote>,
}

impl UpgradeReport {
    /// Whether no step was applied.
    pub fn is_unchanged(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Validated migration chains for every resource type.
#[derive(Debug, Clone)]
pub struct MigrationEngine {
    versions: VersionIndex,
    steps: BTreeMap<(ResourceTypeId, VersionTag), MigrationStep>,
}

impl MigrationEngine {
    /// The built-in chains, checked against `registry`.
    pub fn standard(registry: &SchemaRegistry) -> Result<Self, ConfigurationError> {
        Self::build(registry, chains::standard_steps())
    }

    /// Check `steps` against `registry` and build the engine.
    pub fn build(
        registry: &SchemaRegistry,
        steps: Vec<MigrationStep>,
    ) -> Result<Self, ConfigurationError> {
        let versions = registry.version_index().clone();
        let mut by_source = BTreeMap::new();

        for step in steps {
            let resource_type = step.resource_type;
            if !versions.contains(resource_type, step.from)
                || !versions.contains(resource_type, step.to)
            {
                return Err(ConfigurationError::StepVersionUnknown {
                    resource_type,
                    from: step.from,
                    to: step.to,
                });
            }
            if step.to <= step.from {
                return Err(ConfigurationError::NonAdvancingStep {
                    resource_type,
                    from: step.from,
                    to: step.to,
                });
            }
            if by_source.insert((resource_type, step.from), step).is_some() {
                return Err(ConfigurationError::DuplicateStep {
                    resource_type,
                    from: step.from,
                });
            }
        }

        for resource_type in ResourceTypeId::ALL {
            let Some(latest) = versions.latest(resource_type) else {
                continue;
            };
            for version in versions.versions(resource_type) {
                if version < latest && !by_source.contains_key(&(resource_type, version)) {
                    return Err(ConfigurationError::MissingStep {
                        resource_type,
                        from: version,
                    });
                }
            }
        }

        tracing::debug!(steps = by_source.len(), "migration chains verified");
        Ok(Self {
            versions,
            steps: by_source,
        })
    }

    /// Latest registered version of a type.
    pub fn latest(&self, resource_type: ResourceTypeId) -> Option<VersionTag> {
        self.versions.latest(resource_type)
    }

    /// Upgrade a document to the latest version of its type.
    pub fn upgrade(&self, doc: &RawDocument) -> Result<RawDocument, MigrationError> {
        self.upgrade_with_report(doc).map(|report| report.document)
    }

    /// Upgrade a document and report the steps taken and notes recorded.
    pub fn upgrade_with_report(&self, doc: &RawDocument) -> Result<UpgradeReport, MigrationError> {
        let (resource_type, declared) = discriminator::resolve(doc)?;
        let admission = self
            .versions
            .admit(resource_type, declared, FutureVersionPolicy::Accept)?;
        let latest = self
            .versions
            .latest(resource_type)
            .unwrap_or(admission.effective);

        let mut report = UpgradeReport {
            document: doc.clone(),
            applied: Vec::new(),
            notes: Vec::new(),
        };
        if declared >= latest {
            return Ok(report);
        }

        let mut current = admission.effective;
        let mut mapping: Mapping = doc.to_mapping();
        while current < latest {
            // Completeness was checked at build time.
            let Some(step) = self.steps.get(&(resource_type, current)) else {
                break;
            };
            let (mut next, notes) = step.run(&mapping);
            if let Some(version) = next.get_mut("format_version") {
                *version = Value::from(step.to.to_string());
            }
            tracing::debug!(
                %resource_type,
                from = %step.from,
                to = %step.to,
                notes = notes.len(),
                "applied migration step"
            );
            report.applied.push(AppliedStep::from(step));
            report.notes.extend(notes);
            mapping = next;
            current = step.to;
        }

        report.document =
            RawDocument::from_mapping(mapping).map_err(|source| MigrationError::Document {
                from: admission.effective,
                to: current,
                source,
            })?;
        Ok(report)
    }

    /// Steps of one resource type in chain order.
    pub fn changelog(&self, resource_type: ResourceTypeId) -> Vec<AppliedStep> {
        self.steps
            .values()
            .filter(|step| step.resource_type == resource_type)
            .map(AppliedStep::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepContext;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::standard().unwrap()
    }

    fn noop(_: &mut Mapping, _: &mut StepContext) {}

    fn step(resource_type: ResourceTypeId, from: VersionTag, to: VersionTag) -> MigrationStep {
        MigrationStep::new(resource_type, from, to, "test", noop)
    }

    fn v(major: u32, minor: u32, patch: u32) -> VersionTag {
        VersionTag::new(major, minor, patch)
    }

    #[test]
    fn standard_chains_are_complete() {
        let engine = MigrationEngine::standard(&registry()).unwrap();
        assert_eq!(engine.changelog(ResourceTypeId::Model).len(), 21);
        assert_eq!(engine.changelog(ResourceTypeId::Notebook).len(), 4);
    }

    #[test]
    fn missing_step_detected() {
        let mut steps = chains::standard_steps();
        steps.retain(|s| !(s.resource_type == ResourceTypeId::Model && s.from == v(0, 4, 3)));
        assert_eq!(
            MigrationEngine::build(&registry(), steps).unwrap_err(),
            ConfigurationError::MissingStep {
                resource_type: ResourceTypeId::Model,
                from: v(0, 4, 3),
            }
        );
    }

    #[test]
    fn duplicate_step_detected() {
        let mut steps = chains::standard_steps();
        steps.push(step(ResourceTypeId::Dataset, v(0, 2, 0), v(0, 2, 1)));
        assert!(matches!(
            MigrationEngine::build(&registry(), steps),
            Err(ConfigurationError::DuplicateStep { .. })
        ));
    }

    #[test]
    fn unknown_and_backward_steps_detected() {
        let mut steps = chains::standard_steps();
        steps.push(step(ResourceTypeId::Model, v(0, 4, 11), v(0, 5, 0)));
        assert!(matches!(
            MigrationEngine::build(&registry(), steps),
            Err(ConfigurationError::StepVersionUnknown { .. })
        ));

        let mut steps = chains::standard_steps();
        steps.retain(|s| !(s.resource_type == ResourceTypeId::Generic && s.from == v(0, 2, 3)));
        steps.push(step(ResourceTypeId::Generic, v(0, 2, 3), v(0, 2, 0)));
        assert!(matches!(
            MigrationEngine::build(&registry(), steps),
            Err(ConfigurationError::NonAdvancingStep { .. })
        ));
    }

    #[test]
    fn latest_documents_are_returned_unchanged() {
        let engine = MigrationEngine::standard(&registry()).unwrap();
        let doc = RawDocument::from_yaml_str(
            "format_version: 0.3.0\ntype: dataset\nname: d\ndescription: x\nodd_key: 1\n",
        )
        .unwrap();
        let report = engine.upgrade_with_report(&doc).unwrap();
        assert!(report.is_unchanged());
        assert_eq!(report.document, doc);
    }

    #[test]
    fn future_documents_are_returned_unchanged() {
        let engine = MigrationEngine::standard(&registry()).unwrap();
        let doc = RawDocument::from_yaml_str("format_version: 0.9.0\ntype: model\n").unwrap();
        assert_eq!(engine.upgrade(&doc).unwrap(), doc);
    }

    #[test]
    fn unregistered_patch_starts_from_the_patch_below() {
        let engine = MigrationEngine::standard(&registry()).unwrap();
        let doc = RawDocument::from_yaml_str(
            "format_version: 0.2.9\ntype: generic\nname: n\ndescription: d\n",
        )
        .unwrap();
        let report = engine.upgrade_with_report(&doc).unwrap();
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].from, v(0, 2, 3));
        assert_eq!(report.document.get_str("format_version"), Some("0.3.0"));
    }

    #[test]
    fn unsupported_versions_fail() {
        let engine = MigrationEngine::standard(&registry()).unwrap();
        let doc = RawDocument::from_yaml_str("format_version: 0.1.0\ntype: generic\n").unwrap();
        assert!(matches!(
            engine.upgrade(&doc),
            Err(MigrationError::Discriminator(
                DiscriminatorError::UnsupportedVersion { .. }
            ))
        ));
    }
}
