//! # Cross-Field Checks
//!
//! Checks that relate several fields of one description. They read the
//! typed description and run after all field validators, whatever those
//! found.

use std::collections::{BTreeMap, BTreeSet};

use rdf_core::{FieldPath, FileVerifications, VerificationResult};

use crate::summary::SummaryBuilder;
use crate::typed::{CollectionDescr, ModelDescr, TensorDescr, TypedDescription, WeightsFormat};
use crate::validate::ValidationContext;

/// Run the cross-field checks of the description's resource type.
pub fn check(description: &TypedDescription, ctx: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    if let Some(collection) = description.as_collection() {
        unique_entry_ids(collection, out);
    }
    if let Some(model) = description.as_model() {
        unique_tensor_ids(model, out);
        weights_present(model, out);
        weights_parents(model, out);
        processing_axes(model, out);
        if let Some(shapes) = ctx.shapes {
            halos(model, shapes, out);
        }
    }
}

/// Report files that could not be verified.
pub fn check_files(files: &FileVerifications, out: &mut SummaryBuilder) {
    for (reference, result) in files {
        let loc = reference.field.clone();
        let location = &reference.location;
        match result {
            VerificationResult::Verified => {}
            VerificationResult::Missing => {
                out.error(loc, format!("file {location:?} does not exist"));
            }
            VerificationResult::HashMismatch { expected, actual } => {
                out.error(
                    loc,
                    format!("sha256 of {location:?} is {actual}, expected {expected}"),
                );
            }
            VerificationResult::Unreachable { reason } => {
                out.error(loc, format!("file {location:?} is unreachable: {reason}"));
            }
        }
    }
}

// ─── Collections ────────────────────────────────────────────────────

fn unique_entry_ids(collection: &CollectionDescr, out: &mut SummaryBuilder) {
    let mut seen = BTreeSet::new();
    for (i, entry) in collection.collection.iter().enumerate() {
        if let Some(id) = &entry.id {
            if !seen.insert(id.as_str()) {
                out.error(
                    FieldPath::field("collection").index(i).key("id"),
                    format!("duplicate collection entry id {id:?}"),
                );
            }
        }
    }
}

// ─── Models ─────────────────────────────────────────────────────────

fn tensor_paths(model: &ModelDescr) -> impl Iterator<Item = (FieldPath, &TensorDescr)> {
    let inputs = model
        .inputs
        .iter()
        .enumerate()
        .map(|(i, t)| (FieldPath::field("inputs").index(i), t));
    let outputs = model
        .outputs
        .iter()
        .enumerate()
        .map(|(i, t)| (FieldPath::field("outputs").index(i), t));
    inputs.chain(outputs)
}

fn unique_tensor_ids(model: &ModelDescr, out: &mut SummaryBuilder) {
    let mut seen = BTreeSet::new();
    for (path, tensor) in tensor_paths(model) {
        if !seen.insert(tensor.id.as_str()) {
            out.error(
                path.key("id"),
                format!("duplicate tensor id {:?}", tensor.id),
            );
        }
    }
}

fn weights_present(model: &ModelDescr, out: &mut SummaryBuilder) {
    if model.weights.entries().is_empty() {
        out.error(FieldPath::field("weights"), "at least one weights entry is required");
    }
}

fn weights_parents(model: &ModelDescr, out: &mut SummaryBuilder) {
    let parents: BTreeMap<WeightsFormat, Option<WeightsFormat>> = model
        .weights
        .entries()
        .into_iter()
        .map(|(format, entry)| (format, entry.parent))
        .collect();

    for (&format, &parent) in &parents {
        let Some(parent) = parent else { continue };
        let loc = FieldPath::field("weights").key(format.as_str()).key("parent");
        if parent == format {
            out.error(loc, format!("{format} weights cannot be their own parent"));
            continue;
        }
        if !parents.contains_key(&parent) {
            out.error(loc, format!("parent format {parent} has no weights entry"));
            continue;
        }
        // Follow the chain; revisiting `format` closes a loop.
        let mut current = Some(parent);
        let mut visited = BTreeSet::from([format]);
        while let Some(step) = current {
            if step == format {
                out.error(loc, format!("{format} weights are part of a parent loop"));
                break;
            }
            if !visited.insert(step) {
                break;
            }
            current = parents.get(&step).copied().flatten();
        }
    }
}

fn processing_axes(model: &ModelDescr, out: &mut SummaryBuilder) {
    for (path, tensor) in tensor_paths(model) {
        let steps = [
            ("preprocessing", &tensor.preprocessing),
            ("postprocessing", &tensor.postprocessing),
        ];
        for (key, steps) in steps {
            for (i, step) in steps.iter().enumerate() {
                for axis in step.axes() {
                    if tensor.axis(axis).is_none() {
                        out.error(
                            path.key(key).index(i).key("kwargs").key("axes"),
                            format!("tensor {:?} has no axis {axis:?}", tensor.id),
                        );
                    }
                }
            }
        }
    }
}

fn halos(model: &ModelDescr, shapes: &rdf_shape::ResolvedShapes, out: &mut SummaryBuilder) {
    for (i, tensor) in model.outputs.iter().enumerate() {
        for (j, axis) in tensor.axes.iter().enumerate() {
            let Some(halo) = axis.halo() else { continue };
            let Some(size) = shapes.size(&tensor.id, axis.id()) else {
                continue;
            };
            if halo.saturating_mul(2) > size {
                out.error(
                    FieldPath::field("outputs").index(i).key("axes").index(j).key("halo"),
                    format!(
                        "halo {halo} of {}.{} exceeds half of its minimum size {size}",
                        tensor.id,
                        axis.id()
                    ),
                );
            }
        }
    }
}
