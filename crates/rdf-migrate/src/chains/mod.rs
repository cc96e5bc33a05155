//! # Built-in Migration Chains
//!
//! | Chain      | Steps                                               |
//! |------------|-----------------------------------------------------|
//! | generic    | 0.2.0 → 0.2.1 → 0.2.2 → 0.2.3 → 0.3.0               |
//! | collection | 0.2.0 → 0.2.1 → 0.2.2 → 0.2.3 → 0.3.0               |
//! | model      | 0.3.0 → … → 0.3.6 → 0.4.0 → … → 0.4.10 → 0.5.0 → … → 0.5.3 |
//!
//! Dataset, application and notebook documents share the generic chain.
//! Steps that only bump the version carry their changelog text and an
//! empty edit.

pub mod collection;
pub mod generic;
pub mod model;
mod model_v05;

use rdf_core::{ResourceTypeId, VersionTag};
use serde_yaml::Mapping;

use crate::step::{MigrationStep, StepContext};

pub(crate) const fn v(major: u32, minor: u32, patch: u32) -> VersionTag {
    VersionTag::new(major, minor, patch)
}

/// Edit of a step that changes nothing but the version.
pub(crate) fn version_bump(_: &mut Mapping, _: &mut StepContext) {}

/// One step row: source, target, changelog, edit.
pub(crate) type StepRow = (
    VersionTag,
    VersionTag,
    &'static str,
    crate::step::StepFn,
);

pub(crate) fn expand(resource_type: ResourceTypeId, rows: &[StepRow]) -> Vec<MigrationStep> {
    rows.iter()
        .map(|&(from, to, changelog, apply)| {
            MigrationStep::new(resource_type, from, to, changelog, apply)
        })
        .collect()
}

/// Every built-in step.
pub fn standard_steps() -> Vec<MigrationStep> {
    let mut steps = Vec::new();
    for resource_type in [
        ResourceTypeId::Generic,
        ResourceTypeId::Dataset,
        ResourceTypeId::Application,
        ResourceTypeId::Notebook,
    ] {
        steps.extend(generic::steps(resource_type));
    }
    steps.extend(collection::steps());
    steps.extend(model::steps());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_a_changelog() {
        for step in standard_steps() {
            assert!(!step.changelog.trim().is_empty(), "{step:?}");
        }
    }

    #[test]
    fn chains_are_contiguous() {
        for resource_type in ResourceTypeId::ALL {
            let mut steps: Vec<_> = standard_steps()
                .into_iter()
                .filter(|s| s.resource_type == resource_type)
                .collect();
            steps.sort_by_key(|s| s.from);
            for pair in steps.windows(2) {
                assert_eq!(pair[0].to, pair[1].from, "{resource_type}");
            }
        }
    }
}
