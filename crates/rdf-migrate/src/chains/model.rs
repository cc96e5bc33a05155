//! Model chain, 0.3.0 through 0.5.3.
//!
//! The 0.4.10 → 0.5.0 tensor and weights rewrite lives in `model_v05`.

use rdf_core::{FieldPath, ResourceTypeId};
use rdf_schema::checks::spdx_replacement;
use serde_yaml::{Mapping, Value};

use super::generic::{author_objects, normalize_cite_dois};
use super::model_v05::{to_0_5_0, versions_to_strings};
use super::{expand, v, version_bump, StepRow};
use crate::edit::{
    each_mapping, ensure_list, mapping_mut, rename, set_default, strings_to_objects, take,
};
use crate::step::{MigrationStep, StepContext};

const NO_CHANGE: &str = "No structural change.";

const ROWS: &[StepRow] = &[
    (
        v(0, 3, 0),
        v(0, 3, 1),
        "Author entries of the model, its weights and packaged_by given as plain strings \
         become {name: ...}.",
        model_author_objects,
    ),
    (
        v(0, 3, 1),
        v(0, 3, 2),
        "test_input, test_output, sample_input and sample_output become the lists \
         test_inputs, test_outputs, sample_inputs and sample_outputs.",
        test_file_lists,
    ),
    (v(0, 3, 2), v(0, 3, 3), NO_CHANGE, version_bump),
    (
        v(0, 3, 3),
        v(0, 3, 4),
        "dependencies without a package manager prefix are prefixed with 'conda:'.",
        conda_prefix,
    ),
    (v(0, 3, 4), v(0, 3, 5), NO_CHANGE, version_bump),
    (v(0, 3, 5), v(0, 3, 6), NO_CHANGE, version_bump),
    (
        v(0, 3, 6),
        v(0, 4, 0),
        "language and framework are dropped; source, sha256 and kwargs move into \
         weights.pytorch_state_dict as architecture, architecture_sha256 and kwargs; \
         dependencies move into every weights entry; weights.pytorch_script is renamed \
         torchscript; '/' and '\\' are removed from name; output shape reference_input is \
         renamed reference_tensor.",
        to_0_4_0,
    ),
    (v(0, 4, 0), v(0, 4, 1), NO_CHANGE, version_bump),
    (v(0, 4, 1), v(0, 4, 2), NO_CHANGE, version_bump),
    (v(0, 4, 2), v(0, 4, 3), NO_CHANGE, version_bump),
    (v(0, 4, 3), v(0, 4, 4), NO_CHANGE, version_bump),
    (v(0, 4, 4), v(0, 4, 5), NO_CHANGE, version_bump),
    (v(0, 4, 5), v(0, 4, 6), NO_CHANGE, version_bump),
    (v(0, 4, 6), v(0, 4, 7), NO_CHANGE, version_bump),
    (
        v(0, 4, 7),
        v(0, 4, 8),
        "cite[].doi given as a doi.org URL is reduced to the bare DOI.",
        cite_dois,
    ),
    (
        v(0, 4, 8),
        v(0, 4, 9),
        "Deprecated license identifiers are replaced by their SPDX successors.",
        spdx_license,
    ),
    (v(0, 4, 9), v(0, 4, 10), NO_CHANGE, version_bump),
    (
        v(0, 4, 10),
        v(0, 5, 0),
        "Generic 0.3.0 changes. Tensor name becomes id; axes letters, shape and halo become \
         axis objects with per-axis size expressions; data_type and data_range become \
         data {type, range} with infinite bounds as null; test and sample files move into \
         each tensor's test_tensor and sample_tensor; processing name becomes id and \
         kwargs.axes letters become axis ids; the architecture string becomes \
         {source, callable} or {import_from, callable}; weights dependencies become {source}.",
        to_0_5_0,
    ),
    (v(0, 5, 0), v(0, 5, 1), NO_CHANGE, version_bump),
    (v(0, 5, 1), v(0, 5, 2), NO_CHANGE, version_bump),
    (
        v(0, 5, 2),
        v(0, 5, 3),
        "Numeric pytorch_version and tensorflow_version become strings.",
        versions_to_strings,
    ),
];

/// Model steps.
pub fn steps() -> Vec<MigrationStep> {
    expand(ResourceTypeId::Model, ROWS)
}

/// Every weights entry, by format key.
pub(crate) fn each_weights_entry(doc: &mut Mapping, mut f: impl FnMut(&str, &mut Mapping)) {
    let Some(weights) = mapping_mut(doc, "weights") else {
        return;
    };
    for (format, entry) in weights.iter_mut() {
        if let (Some(format), Some(entry)) = (format.as_str(), entry.as_mapping_mut()) {
            f(format, entry);
        }
    }
}

fn model_author_objects(doc: &mut Mapping, ctx: &mut StepContext) {
    author_objects(doc, ctx);
    strings_to_objects(doc, "packaged_by", "name");
    each_weights_entry(doc, |_, entry| strings_to_objects(entry, "authors", "name"));
}

fn test_file_lists(doc: &mut Mapping, _: &mut StepContext) {
    for (old, new) in [
        ("test_input", "test_inputs"),
        ("test_output", "test_outputs"),
        ("sample_input", "sample_inputs"),
        ("sample_output", "sample_outputs"),
    ] {
        rename(doc, old, new);
        ensure_list(doc, new);
    }
}

fn has_manager_prefix(dependencies: &str) -> bool {
    ["conda:", "pip:"]
        .iter()
        .any(|prefix| dependencies.starts_with(prefix))
}

fn conda_prefix(doc: &mut Mapping, _: &mut StepContext) {
    if let Some(Value::String(deps)) = doc.get_mut("dependencies") {
        if !has_manager_prefix(deps) {
            *deps = format!("conda:{deps}");
        }
    }
}

fn to_0_4_0(doc: &mut Mapping, ctx: &mut StepContext) {
    for key in ["language", "framework"] {
        if take(doc, key).is_some_and(|v| !v.is_null()) {
            ctx.note(FieldPath::field(key), "dropped; the field no longer exists");
        }
    }

    if let Some(weights) = mapping_mut(doc, "weights") {
        rename(weights, "pytorch_script", "torchscript");
    }

    let moved: Vec<(&str, Value)> = [
        ("source", "architecture"),
        ("sha256", "architecture_sha256"),
        ("kwargs", "kwargs"),
    ]
    .into_iter()
    .filter_map(|(from, to)| take(doc, from).filter(|v| !v.is_null()).map(|v| (to, v)))
    .collect();
    if !moved.is_empty() {
        match mapping_mut(doc, "weights").and_then(|w| mapping_mut(w, "pytorch_state_dict")) {
            Some(entry) => {
                for (key, value) in moved {
                    set_default(entry, key, value);
                }
            }
            None => {
                for (key, _) in moved {
                    ctx.note(
                        FieldPath::field("weights").key("pytorch_state_dict").key(key),
                        "dropped; there are no pytorch_state_dict weights to attach it to",
                    );
                }
            }
        }
    }

    if let Some(deps) = take(doc, "dependencies").filter(|v| !v.is_null()) {
        each_weights_entry(doc, |_, entry| set_default(entry, "dependencies", deps.clone()));
    }

    if let Some(Value::String(name)) = doc.get_mut("name") {
        if name.contains(['/', '\\']) {
            let cleaned: String = name.chars().filter(|&c| !matches!(c, '/' | '\\')).collect();
            ctx.note(
                FieldPath::field("name"),
                format!("{name:?} renamed to {cleaned:?}"),
            );
            *name = cleaned;
        }
    }

    each_mapping(doc, "outputs", |_, tensor| {
        if let Some(shape) = mapping_mut(tensor, "shape") {
            rename(shape, "reference_input", "reference_tensor");
        }
    });
}

fn cite_dois(doc: &mut Mapping, _: &mut StepContext) {
    normalize_cite_dois(doc);
}

fn spdx_license(doc: &mut Mapping, ctx: &mut StepContext) {
    if let Some(Value::String(license)) = doc.get_mut("license") {
        if let Some(replacement) = spdx_replacement(license) {
            ctx.note(
                FieldPath::field("license"),
                format!("{license:?} replaced by {replacement:?}"),
            );
            *license = replacement.to_string();
        }
    }
}
