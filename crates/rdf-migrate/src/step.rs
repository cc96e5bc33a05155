//! # Migration Steps
//!
//! A [`MigrationStep`] upgrades documents of one resource type from one
//! registered format version to a later one. Steps are plain function
//! pointers over a YAML mapping: no I/O, no shared state, total for any
//! input. A step that meets a value it does not understand leaves it
//! untouched; materialization against the latest schema reports it later.
//!
//! Steps never write `format_version`; the engine sets it to the step
//! target after the step returns.

use std::fmt;

use rdf_core::{FieldPath, MigrationNote, ResourceTypeId, VersionTag};
use serde::Serialize;
use serde_yaml::Mapping;

/// Body of a migration step.
pub type StepFn = fn(&mut Mapping, &mut StepContext);

/// One registered upgrade from `from` to `to`.
#[derive(Clone, Copy)]
pub struct MigrationStep {
    /// Resource type the step applies to.
    pub resource_type: ResourceTypeId,
    /// Source version.
    pub from: VersionTag,
    /// Target version.
    pub to: VersionTag,
    /// Whether the step crosses a minor version.
    pub breaking: bool,
    /// What the step changes, for audit tooling.
    pub changelog: &'static str,
    /// The edit itself.
    pub apply: StepFn,
}

impl MigrationStep {
    /// A step whose `breaking` flag follows from its versions.
    pub fn new(
        resource_type: ResourceTypeId,
        from: VersionTag,
        to: VersionTag,
        changelog: &'static str,
        apply: StepFn,
    ) -> Self {
        Self {
            resource_type,
            from,
            to,
            breaking: !from.same_minor(&to),
            changelog,
            apply,
        }
    }

    /// Run the step on a copy of `doc`, returning the edited copy and the
    /// notes recorded on the way.
    pub fn run(&self, doc: &Mapping) -> (Mapping, Vec<MigrationNote>) {
        let mut out = doc.clone();
        let mut ctx = StepContext::new(self.from, self.to);
        (self.apply)(&mut out, &mut ctx);
        (out, ctx.notes)
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("resource_type", &self.resource_type)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("breaking", &self.breaking)
            .field("changelog", &self.changelog)
            .finish()
    }
}

/// Collects notes about information a step could not carry forward.
#[derive(Debug)]
pub struct StepContext {
    from: VersionTag,
    to: VersionTag,
    notes: Vec<MigrationNote>,
}

impl StepContext {
    pub(crate) fn new(from: VersionTag, to: VersionTag) -> Self {
        Self {
            from,
            to,
            notes: Vec::new(),
        }
    }

    /// Record a note against `field`.
    pub fn note(&mut self, field: FieldPath, message: impl Into<String>) {
        self.notes.push(MigrationNote {
            from: self.from,
            to: self.to,
            field,
            message: message.into(),
        });
    }

    /// Notes recorded so far.
    pub fn notes(&self) -> &[MigrationNote] {
        &self.notes
    }
}

/// A step that was applied during an upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedStep {
    /// Resource type of the chain.
    pub resource_type: ResourceTypeId,
    /// Source version.
    pub from: VersionTag,
    /// Target version.
    pub to: VersionTag,
    /// Whether the step crosses a minor version.
    pub breaking: bool,
    /// Changelog text of the step.
    pub changelog: &'static str,
}

impl From<&MigrationStep> for AppliedStep {
    fn from(step: &MigrationStep) -> Self {
        Self {
            resource_type: step.resource_type,
            from: step.from,
            to: step.to,
            breaking: step.breaking,
            changelog: step.changelog,
        }
    }
}

impl fmt::Display for AppliedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.breaking { " (breaking)" } else { "" };
        write!(
            f,
            "{} {} -> {}{marker}: {}",
            self.resource_type, self.from, self.to, self.changelog
        )
    }
}
