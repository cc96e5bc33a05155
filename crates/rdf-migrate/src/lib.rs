//! # rdf-migrate — Forward-Only Format Migration
//!
//! Upgrades resource descriptions of any registered format version to the
//! latest version of their type by chaining pure, per-version steps.
//!
//! ## Steps (`step`, `edit`)
//!
//! A [`MigrationStep`] is a function pointer over a YAML mapping plus the
//! metadata needed for audit: resource type, source and target versions,
//! and a changelog line. Steps record information they cannot carry forward
//! as [`rdf_core::MigrationNote`]s through a [`StepContext`]; they never
//! fail. `edit` holds the order-preserving mapping edits shared by the
//! chains.
//!
//! ## Chains (`chains`)
//!
//! The built-in chains cover the generic family (generic, dataset,
//! application, notebook), collections, and models from 0.3.0 to 0.5.3.
//!
//! ## Engine (`engine`)
//!
//! [`MigrationEngine`] checks the chains against the schema registry at
//! construction and upgrades documents by walking the chain from the
//! admitted version to latest. [`UpgradeReport`] lists the steps applied
//! and the notes recorded.
//!
//! ## Design
//!
//! Migration is forward-only. A document is never downgraded, and a
//! document at or above latest is returned unchanged. Upgrading an
//! upgraded document is a no-op.

pub mod chains;
pub mod edit;
pub mod engine;
pub mod step;

pub use engine::{MigrationEngine, MigrationError, UpgradeReport};
pub use step::{AppliedStep, MigrationStep, StepContext, StepFn};
