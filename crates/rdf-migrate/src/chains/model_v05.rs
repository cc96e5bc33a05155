//! # Model 0.5 Layout
//!
//! The 0.4.10 → 0.5.0 step rewrites every tensor and weights entry. Legacy
//! tensors describe their axes as a letter string (`"bcyx"`) with a parallel
//! `shape` and `halo`; the 0.5 layout gives each axis its own object.
//!
//! | Letter  | Axis    | Id         |
//! |---------|---------|------------|
//! | `b`     | batch   | `batch`    |
//! | `c`     | channel | `channel`  |
//! | `i`     | index   | `index`    |
//! | `t`     | time    | `time`     |
//! | `x y z` | space   | the letter |
//!
//! ## Sizes
//!
//! The size of axis `k` comes from position `k` of the legacy shape:
//!
//! - explicit shape → fixed size;
//! - `{min, step}` → parametrized size, or fixed when `step` is 0;
//! - `{reference_tensor, scale, offset}` → a reference to the axis at
//!   position `k` of the referenced tensor. A `null` scale marks an axis
//!   that does not exist in the reference; its size is `2 * offset`.
//!
//! Legacy offsets may be fractional; the 0.5 reference offset is an
//! integer, so offsets are rounded and the rounding is noted. Rounding
//! changes the axis size by `2 * (rounded - offset)`: a half-integer
//! offset of 1.5 becomes 2 and the axis grows by one (`2 * 1.5 = 3`
//! becomes `2 * 2 = 4`).
//!
//! A tensor whose axes and shape cannot be read is left with its legacy
//! `axes` and `shape` so that materialization reports them.

use rdf_core::FieldPath;
use rdf_schema::definitions::model::WEIGHTS_FORMATS;
use serde_yaml::{Mapping, Value};

use super::generic::to_latest_generic;
use super::model::each_weights_entry;
use crate::edit::{mapping, take};
use crate::step::StepContext;

// ─── Legacy Tensors ─────────────────────────────────────────────────

enum LegacyShape {
    Explicit(Vec<u64>),
    Parametrized { min: Vec<u64>, step: Vec<u64> },
    Reference {
        tensor: String,
        scale: Vec<Option<f64>>,
        offset: Vec<f64>,
    },
    Unreadable,
}

struct LegacyTensor {
    name: String,
    axes: Vec<char>,
    shape: LegacyShape,
}

fn u64_list(value: Option<&Value>) -> Option<Vec<u64>> {
    value?.as_sequence()?.iter().map(Value::as_u64).collect()
}

impl LegacyShape {
    fn parse(shape: Option<&Value>) -> Self {
        match shape {
            Some(Value::Sequence(_)) => u64_list(shape).map_or(Self::Unreadable, Self::Explicit),
            Some(Value::Mapping(map)) => {
                if let (Some(min), Some(step)) = (u64_list(map.get("min")), u64_list(map.get("step")))
                {
                    return Self::Parametrized { min, step };
                }
                let tensor = map.get("reference_tensor").and_then(Value::as_str);
                let scale = map
                    .get("scale")
                    .and_then(Value::as_sequence)
                    .map(|items| items.iter().map(Value::as_f64).collect());
                let offset = map
                    .get("offset")
                    .and_then(Value::as_sequence)
                    .map(|items| items.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect());
                match (tensor, scale, offset) {
                    (Some(tensor), Some(scale), Some(offset)) => Self::Reference {
                        tensor: tensor.to_string(),
                        scale,
                        offset,
                    },
                    _ => Self::Unreadable,
                }
            }
            _ => Self::Unreadable,
        }
    }

    fn len(&self) -> Option<usize> {
        match self {
            Self::Explicit(sizes) => Some(sizes.len()),
            Self::Parametrized { min, step } => (min.len() == step.len()).then_some(min.len()),
            Self::Reference { scale, offset, .. } => {
                (scale.len() == offset.len()).then_some(scale.len())
            }
            Self::Unreadable => None,
        }
    }
}

impl LegacyTensor {
    fn parse(map: &Mapping) -> Self {
        Self {
            name: map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            axes: map
                .get("axes")
                .and_then(Value::as_str)
                .map(|s| s.chars().collect())
                .unwrap_or_default(),
            shape: LegacyShape::parse(map.get("shape")),
        }
    }

    fn is_convertible(&self) -> bool {
        !self.axes.is_empty() && self.shape.len() == Some(self.axes.len())
    }
}

/// Position in the referenced tensor of output axis `k`; axes with a `null`
/// scale do not exist in the reference.
fn reference_index(scale: &[Option<f64>], k: usize) -> usize {
    k - scale[..k].iter().filter(|s| s.is_none()).count()
}

fn axis_id(letter: char) -> String {
    match letter {
        'b' => "batch".to_string(),
        'c' => "channel".to_string(),
        'i' => "index".to_string(),
        't' => "time".to_string(),
        other => other.to_string(),
    }
}

// ─── Conversion ─────────────────────────────────────────────────────

struct TensorSet {
    tensors: Vec<LegacyTensor>,
}

impl TensorSet {
    fn find(&self, name: &str) -> Option<&LegacyTensor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    /// Concrete extent of axis `k`, following at most one reference.
    fn extent(&self, tensor: &LegacyTensor, k: usize) -> Option<u64> {
        match &tensor.shape {
            LegacyShape::Explicit(sizes) => sizes.get(k).copied(),
            LegacyShape::Parametrized { min, .. } => min.get(k).copied(),
            LegacyShape::Reference {
                tensor: reference,
                scale,
                offset,
            } => {
                let offset = offset.get(k).copied().unwrap_or(0.0);
                let base = match scale.get(k).copied().flatten() {
                    None => 0.0,
                    Some(s) => {
                        let referenced = self.find(reference)?;
                        let j = reference_index(scale, k);
                        let size = match &referenced.shape {
                            LegacyShape::Explicit(sizes) => sizes.get(j).copied(),
                            LegacyShape::Parametrized { min, .. } => min.get(j).copied(),
                            _ => None,
                        }?;
                        size as f64 * s
                    }
                };
                let extent = base + 2.0 * offset;
                (extent >= 0.0).then(|| extent.round() as u64)
            }
            LegacyShape::Unreadable => None,
        }
    }

    fn size(&self, tensor: &LegacyTensor, k: usize, path: &FieldPath, ctx: &mut StepContext) -> Value {
        match &tensor.shape {
            LegacyShape::Explicit(sizes) => Value::from(sizes[k]),
            LegacyShape::Parametrized { min, step } if step[k] == 0 => Value::from(min[k]),
            LegacyShape::Parametrized { min, step } => Value::Mapping(mapping([
                ("min", Value::from(min[k])),
                ("step", Value::from(step[k])),
            ])),
            LegacyShape::Reference {
                tensor: reference,
                scale,
                offset,
            } => {
                let rounded = offset[k].round();
                if rounded != offset[k] {
                    let change = 2.0 * (rounded - offset[k]);
                    ctx.note(
                        path.key("size").key("offset"),
                        format!(
                            "offset {} rounded to {rounded}; the axis size changes by {change:+}",
                            offset[k]
                        ),
                    );
                }
                let rounded = rounded as i64;
                match scale[k] {
                    None => Value::from((2 * rounded).max(0) as u64),
                    Some(factor) => {
                        let letter = self
                            .find(reference)
                            .and_then(|t| t.axes.get(reference_index(scale, k)).copied())
                            .unwrap_or(tensor.axes[k]);
                        let mut size = mapping([
                            ("tensor_id", Value::from(reference.as_str())),
                            ("axis_id", Value::from(axis_id(letter))),
                        ]);
                        if factor != 1.0 {
                            size.insert(Value::from("scale"), Value::from(factor));
                        }
                        if rounded != 0 {
                            size.insert(Value::from("offset"), Value::from(rounded));
                        }
                        Value::Mapping(size)
                    }
                }
            }
            LegacyShape::Unreadable => Value::Null,
        }
    }

    fn axes(
        &self,
        tensor: &LegacyTensor,
        halo: &[u64],
        path: &FieldPath,
        ctx: &mut StepContext,
    ) -> Value {
        let mut axes = Vec::with_capacity(tensor.axes.len());
        for (k, &letter) in tensor.axes.iter().enumerate() {
            let axis_path = path.index(k);
            let mut axis = Mapping::new();
            let halo = halo.get(k).copied().unwrap_or(0);
            let mut carries_halo = false;
            match letter {
                'b' => {
                    axis.insert(Value::from("type"), Value::from("batch"));
                    if let LegacyShape::Explicit(sizes) = &tensor.shape {
                        if sizes[k] != 1 {
                            axis.insert(Value::from("size"), Value::from(sizes[k]));
                        }
                    }
                }
                'c' => {
                    axis.insert(Value::from("type"), Value::from("channel"));
                    let count = self.extent(tensor, k).unwrap_or_else(|| {
                        ctx.note(
                            axis_path.key("channel_names"),
                            "channel count could not be determined; assuming 1",
                        );
                        1
                    });
                    if matches!(&tensor.shape, LegacyShape::Parametrized { step, .. } if step[k] != 0)
                    {
                        ctx.note(
                            axis_path.key("channel_names"),
                            format!("parametrized channel count; using the minimum {count}"),
                        );
                    }
                    let names = (0..count)
                        .map(|i| Value::from(format!("channel{i}")))
                        .collect();
                    axis.insert(Value::from("channel_names"), Value::Sequence(names));
                }
                'i' | 't' => {
                    let kind = if letter == 'i' { "index" } else { "time" };
                    axis.insert(Value::from("type"), Value::from(kind));
                    axis.insert(Value::from("size"), self.size(tensor, k, &axis_path, ctx));
                    carries_halo = letter == 't';
                }
                other => {
                    axis.insert(Value::from("type"), Value::from("space"));
                    axis.insert(Value::from("id"), Value::from(other.to_string()));
                    axis.insert(Value::from("size"), self.size(tensor, k, &axis_path, ctx));
                    carries_halo = true;
                }
            }
            if halo > 0 {
                if carries_halo {
                    axis.insert(Value::from("halo"), Value::from(halo));
                } else {
                    ctx.note(
                        axis_path.key("halo"),
                        format!("halo {halo} dropped; only space and time axes carry a halo"),
                    );
                }
            }
            axes.push(Value::Mapping(axis));
        }
        Value::Sequence(axes)
    }
}

fn bound(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if !f.is_finite() => Value::Null,
        _ => value.clone(),
    }
}

fn file_descr(source: Value) -> Value {
    match source {
        Value::String(_) => Value::Mapping(mapping([("source", source)])),
        other => other,
    }
}

fn convert_processing(items: Value, path: &FieldPath, ctx: &mut StepContext) -> Value {
    let Value::Sequence(items) = items else {
        return items;
    };
    let converted = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Mapping(mut op) = item else {
                return item;
            };
            let mut id = take(&mut op, "name").or_else(|| take(&mut op, "id"));
            if let Some(Value::Mapping(kwargs)) = op.get_mut("kwargs") {
                let ids = match kwargs.get("axes") {
                    Some(Value::String(letters)) => {
                        Some(letters.chars().map(|c| Value::from(axis_id(c))).collect())
                    }
                    _ => None,
                };
                if let Some(ids) = ids {
                    kwargs.insert(Value::from("axes"), Value::Sequence(ids));
                }
                match take(kwargs, "mode").as_ref().and_then(Value::as_str) {
                    None | Some("per_sample") => {}
                    Some("fixed")
                        if id.as_ref().and_then(Value::as_str)
                            == Some("zero_mean_unit_variance") =>
                    {
                        id = Some(Value::from("fixed_zero_mean_unit_variance"));
                    }
                    Some(mode) => ctx.note(
                        path.index(i).key("kwargs").key("mode"),
                        format!("mode {mode:?} dropped; statistics are computed per sample"),
                    ),
                }
            }
            let mut out = Mapping::new();
            if let Some(id) = id {
                out.insert(Value::from("id"), id);
            }
            out.extend(op);
            Value::Mapping(out)
        })
        .collect();
    Value::Sequence(converted)
}

#[allow(clippy::too_many_arguments)]
fn convert_tensor(
    mut src: Mapping,
    legacy: &LegacyTensor,
    set: &TensorSet,
    path: &FieldPath,
    test_tensor: Option<Value>,
    sample_tensor: Option<Value>,
    output: bool,
    ctx: &mut StepContext,
) -> Mapping {
    let mut out = Mapping::new();
    if let Some(name) = take(&mut src, "name") {
        out.insert(Value::from("id"), name);
    }
    if let Some(description) = take(&mut src, "description") {
        out.insert(Value::from("description"), description);
    }

    let halo = u64_list(take(&mut src, "halo").as_ref()).unwrap_or_default();
    if legacy.is_convertible() {
        take(&mut src, "axes");
        take(&mut src, "shape");
        out.insert(
            Value::from("axes"),
            set.axes(legacy, &halo, &path.key("axes"), ctx),
        );
    } else {
        ctx.note(
            path.key("axes"),
            "axes and shape could not be read; left unconverted",
        );
        for key in ["axes", "shape"] {
            if let Some(value) = take(&mut src, key) {
                out.insert(Value::from(key), value);
            }
        }
    }

    let mut data = Mapping::new();
    if let Some(data_type) = take(&mut src, "data_type") {
        data.insert(Value::from("type"), data_type);
    }
    if let Some(Value::Sequence(range)) = take(&mut src, "data_range") {
        data.insert(
            Value::from("range"),
            Value::Sequence(range.iter().map(bound).collect()),
        );
    }
    if !data.is_empty() {
        out.insert(Value::from("data"), Value::Mapping(data));
    }

    if let Some(source) = test_tensor {
        out.insert(Value::from("test_tensor"), file_descr(source));
    }
    if let Some(source) = sample_tensor {
        out.insert(Value::from("sample_tensor"), file_descr(source));
    }

    let processing_key = if output { "postprocessing" } else { "preprocessing" };
    if let Some(ops) = take(&mut src, processing_key) {
        out.insert(
            Value::from(processing_key),
            convert_processing(ops, &path.key(processing_key), ctx),
        );
    }

    out.extend(src);
    out
}

fn take_files(doc: &mut Mapping, key: &str) -> Vec<Value> {
    match take(doc, key) {
        Some(Value::Sequence(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}

fn convert_tensors(doc: &mut Mapping, ctx: &mut StepContext) {
    let mut lists: Vec<(&str, Vec<Value>, Vec<Value>, Vec<Value>)> = Vec::new();
    for (key, tests, samples) in [
        ("inputs", "test_inputs", "sample_inputs"),
        ("outputs", "test_outputs", "sample_outputs"),
    ] {
        let tensors = match doc.get(key) {
            Some(Value::Sequence(items)) => items.clone(),
            _ => Vec::new(),
        };
        let tests = take_files(doc, tests);
        let samples = take_files(doc, samples);
        lists.push((key, tensors, tests, samples));
    }

    let set = TensorSet {
        tensors: lists
            .iter()
            .flat_map(|(_, tensors, _, _)| tensors.iter())
            .filter_map(Value::as_mapping)
            .map(LegacyTensor::parse)
            .collect(),
    };

    for (key, tensors, tests, samples) in lists {
        if tensors.is_empty() {
            continue;
        }
        let output = key == "outputs";
        let (test_key, sample_key) = if output {
            ("test_outputs", "sample_outputs")
        } else {
            ("test_inputs", "sample_inputs")
        };
        for (files, files_key) in [(&tests, test_key), (&samples, sample_key)] {
            if files.len() > tensors.len() {
                ctx.note(
                    FieldPath::field(files_key),
                    format!(
                        "{} files for {} {key}; the extra files were dropped",
                        files.len(),
                        tensors.len()
                    ),
                );
            }
        }
        let mut tests = tests.into_iter();
        let mut samples = samples.into_iter();
        let converted = tensors
            .into_iter()
            .enumerate()
            .map(|(i, tensor)| {
                let test = tests.next();
                let sample = samples.next();
                match tensor {
                    Value::Mapping(src) => {
                        let legacy = LegacyTensor::parse(&src);
                        Value::Mapping(convert_tensor(
                            src,
                            &legacy,
                            &set,
                            &FieldPath::field(key).index(i),
                            test,
                            sample,
                            output,
                            ctx,
                        ))
                    }
                    other => other,
                }
            })
            .collect();
        doc.insert(Value::from(key), Value::Sequence(converted));
    }
}

// ─── Weights ────────────────────────────────────────────────────────

fn convert_architecture(entry: &mut Mapping) {
    let Some(Value::String(spec)) = entry.get("architecture").cloned() else {
        return;
    };
    let sha256 = take(entry, "architecture_sha256");
    let kwargs = take(entry, "kwargs");
    let mut architecture = if let Some((source, callable)) = spec.split_once(':') {
        let mut arch = mapping([
            ("source", Value::from(source)),
            ("callable", Value::from(callable)),
        ]);
        if let Some(sha256) = sha256 {
            arch.insert(Value::from("sha256"), sha256);
        }
        arch
    } else if let Some((module, callable)) = spec.rsplit_once('.') {
        mapping([
            ("import_from", Value::from(module)),
            ("callable", Value::from(callable)),
        ])
    } else {
        // Neither form; left for materialization to report.
        return;
    };
    if let Some(kwargs) = kwargs {
        architecture.insert(Value::from("kwargs"), kwargs);
    }
    entry.insert(Value::from("architecture"), Value::Mapping(architecture));
}

fn convert_weights(doc: &mut Mapping, ctx: &mut StepContext) {
    let mut dropped = Vec::new();
    each_weights_entry(doc, |format, entry| {
        let path = FieldPath::field("weights").key(format);
        convert_architecture(entry);

        if let Some(Value::String(deps)) = entry.get("dependencies") {
            let source = match deps.split_once(':') {
                Some(("conda" | "pip", rest)) => rest.to_string(),
                _ => deps.clone(),
            };
            entry.insert(
                Value::from("dependencies"),
                Value::Mapping(mapping([("source", Value::from(source))])),
            );
        }

        if take(entry, "attachments").is_some_and(|v| !v.is_null()) {
            dropped.push((path.key("attachments"), "dropped; weights no longer carry attachments".to_string()));
        }

        if let Some(Value::String(parent)) = entry.get("parent") {
            if !WEIGHTS_FORMATS.contains(&parent.as_str()) {
                dropped.push((
                    path.key("parent"),
                    format!("{parent:?} dropped; parent must name another weights format"),
                ));
                take(entry, "parent");
            }
        }
    });
    for (path, message) in dropped {
        ctx.note(path, message);
    }
}

fn linked_resources(doc: &mut Mapping, ctx: &mut StepContext) {
    for key in ["parent", "training_data"] {
        let keep = match doc.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::Mapping(map)) => map.get("id").is_some_and(Value::is_string),
            Some(_) => false,
        };
        if !keep {
            take(doc, key);
            ctx.note(
                FieldPath::field(key),
                "dropped; only a reference by resource id can be carried forward",
            );
        }
    }
}

// ─── Steps ──────────────────────────────────────────────────────────

/// 0.4.10 → 0.5.0.
pub(crate) fn to_0_5_0(doc: &mut Mapping, ctx: &mut StepContext) {
    to_latest_generic(doc, ctx);
    convert_tensors(doc, ctx);
    convert_weights(doc, ctx);
    linked_resources(doc, ctx);
}

/// 0.5.2 → 0.5.3: numeric framework versions become strings.
pub(crate) fn versions_to_strings(doc: &mut Mapping, _: &mut StepContext) {
    each_weights_entry(doc, |_, entry| {
        for key in ["pytorch_version", "tensorflow_version"] {
            if let Some(Value::Number(n)) = entry.get(key) {
                let text = n.to_string();
                entry.insert(Value::from(key), Value::from(text));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::VersionTag;

    fn run(yaml: &str) -> (Value, Vec<rdf_core::MigrationNote>) {
        let mut doc: Mapping = serde_yaml::from_str(yaml).unwrap();
        let mut ctx = StepContext::new(VersionTag::new(0, 4, 10), VersionTag::new(0, 5, 0));
        to_0_5_0(&mut doc, &mut ctx);
        (Value::Mapping(doc), ctx.notes().to_vec())
    }

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    const UNET: &str = r#"
inputs:
  - name: raw
    axes: bcyx
    data_type: float32
    data_range: [-.inf, .inf]
    shape: {min: [1, 1, 64, 64], step: [0, 0, 16, 16]}
    preprocessing:
      - name: zero_mean_unit_variance
        kwargs: {axes: yx, mode: per_sample}
outputs:
  - name: probability
    axes: bcyx
    data_type: float32
    data_range: [0, 1]
    halo: [0, 0, 8, 8]
    shape: {reference_tensor: raw, scale: [1, 1, 1, 1], offset: [0, 0.5, 0, 0]}
test_inputs: [in.npy]
test_outputs: [out.npy]
sample_inputs: [in.tif]
weights:
  pytorch_state_dict:
    source: weights.pt
    architecture: unet.py:UNet2d
    architecture_sha256: e4d3885bccbe41cbf6c1d825f3cd2b707c7021ead5593156007e407a16b27cf2
    kwargs: {depth: 4}
    dependencies: conda:environment.yaml
  onnx:
    source: weights.onnx
    parent: pytorch_state_dict
    attachments: {files: [x.txt]}
"#;

    #[test]
    fn tensors_convert_axis_by_axis() {
        let (doc, _) = run(UNET);
        let expected_input = yaml(
            r#"
id: raw
axes:
  - {type: batch}
  - {type: channel, channel_names: [channel0]}
  - {type: space, id: y, size: {min: 64, step: 16}}
  - {type: space, id: x, size: {min: 64, step: 16}}
data: {type: float32, range: [null, null]}
test_tensor: {source: in.npy}
sample_tensor: {source: in.tif}
preprocessing:
  - id: zero_mean_unit_variance
    kwargs: {axes: [y, x]}
"#,
        );
        assert_eq!(doc["inputs"][0], expected_input);

        let output = &doc["outputs"][0];
        assert_eq!(output["id"], Value::from("probability"));
        assert_eq!(
            output["axes"][2],
            yaml("{type: space, id: y, size: {tensor_id: raw, axis_id: y}, halo: 8}")
        );
        assert_eq!(output["test_tensor"], yaml("{source: out.npy}"));
        assert!(output.get("sample_tensor").is_none());
        assert!(doc.get("test_inputs").is_none());
    }

    #[test]
    fn channel_count_follows_reference_and_offset_is_rounded() {
        let (doc, notes) = run(UNET);
        // 1 * 1 + 2 * 0.5 channels; channel axes carry no size to round.
        assert_eq!(
            doc["outputs"][0]["axes"][1],
            yaml("{type: channel, channel_names: [channel0, channel1]}")
        );
        assert!(notes
            .iter()
            .all(|n| !n.field.to_string().contains("offset")));
    }

    #[test]
    fn weights_convert() {
        let (doc, notes) = run(UNET);
        let expected = yaml(
            r#"
source: weights.pt
architecture:
  source: unet.py
  callable: UNet2d
  sha256: e4d3885bccbe41cbf6c1d825f3cd2b707c7021ead5593156007e407a16b27cf2
  kwargs: {depth: 4}
dependencies: {source: environment.yaml}
"#,
        );
        assert_eq!(doc["weights"]["pytorch_state_dict"], expected);
        assert_eq!(doc["weights"]["onnx"], yaml("{source: weights.onnx, parent: pytorch_state_dict}"));
        let fields: Vec<String> = notes.iter().map(|n| n.field.to_string()).collect();
        assert_eq!(fields, vec!["weights.onnx.attachments"]);
    }

    #[test]
    fn library_architecture() {
        let mut entry: Mapping =
            serde_yaml::from_str("architecture: torchvision.models.resnet50\nkwargs: {}\n").unwrap();
        convert_architecture(&mut entry);
        assert_eq!(
            Value::Mapping(entry),
            yaml("architecture: {import_from: torchvision.models, callable: resnet50, kwargs: {}}")
        );
    }

    #[test]
    fn new_output_axis_and_fractional_offset() {
        let (doc, notes) = run(
            r#"
inputs:
  - {name: a, axes: byx, data_type: float32, shape: [1, 32, 32]}
outputs:
  - name: b
    axes: bcyx
    data_type: float32
    shape: {reference_tensor: a, scale: [1, null, 0.5, 0.5], offset: [0, 2, 1.5, 0]}
"#,
        );
        let axes = &doc["outputs"][0]["axes"];
        assert_eq!(axes[1], yaml("{type: channel, channel_names: [channel0, channel1, channel2, channel3]}"));
        assert_eq!(
            axes[2],
            yaml("{type: space, id: y, size: {tensor_id: a, axis_id: y, scale: 0.5, offset: 2}}")
        );
        let fields: Vec<String> = notes.iter().map(|n| n.field.to_string()).collect();
        assert_eq!(fields, vec!["outputs[0].axes[2].size.offset"]);
        assert_eq!(
            notes[0].message,
            "offset 1.5 rounded to 2; the axis size changes by +1"
        );
    }

    #[test]
    fn reference_axis_after_a_new_axis_keeps_its_own_scale() {
        let (doc, notes) = run(
            r#"
inputs:
  - {name: a, axes: bxy, data_type: float32, shape: [1, 64, 48]}
outputs:
  - name: b
    axes: bcxy
    data_type: float32
    shape: {reference_tensor: a, scale: [1, null, 2, 1], offset: [0, 1, 0, 0]}
"#,
        );
        let axes = &doc["outputs"][0]["axes"];
        assert_eq!(axes[0], yaml("{type: batch}"));
        assert_eq!(axes[1], yaml("{type: channel, channel_names: [channel0, channel1]}"));
        assert_eq!(
            axes[2],
            yaml("{type: space, id: x, size: {tensor_id: a, axis_id: x, scale: 2}}")
        );
        assert_eq!(axes[3], yaml("{type: space, id: y, size: {tensor_id: a, axis_id: y}}"));
        assert!(notes.is_empty());
    }

    #[test]
    fn fixed_mode_becomes_its_own_operation() {
        let mut ctx = StepContext::new(VersionTag::new(0, 4, 10), VersionTag::new(0, 5, 0));
        let ops = yaml("[{name: zero_mean_unit_variance, kwargs: {mode: fixed, mean: 1, std: 2, axes: c}}]");
        let out = convert_processing(ops, &FieldPath::field("preprocessing"), &mut ctx);
        assert_eq!(
            out,
            yaml("[{id: fixed_zero_mean_unit_variance, kwargs: {mean: 1, std: 2, axes: [channel]}}]")
        );
        assert!(ctx.notes().is_empty());
    }

    #[test]
    fn loose_parent_is_dropped() {
        let (doc, notes) = run("parent: {uri: 'https://x.org/m.yaml'}\ntraining_data: {id: org/dataset}\n");
        assert!(doc.get("parent").is_none());
        assert_eq!(doc["training_data"], yaml("{id: org/dataset}"));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn framework_versions_become_strings() {
        let mut doc: Mapping = serde_yaml::from_str(
            "weights:\n  torchscript: {source: w.pt, pytorch_version: 1.13}\n  keras_hdf5: {source: w.h5, tensorflow_version: '2.1'}\n",
        )
        .unwrap();
        let mut ctx = StepContext::new(VersionTag::new(0, 5, 2), VersionTag::new(0, 5, 3));
        versions_to_strings(&mut doc, &mut ctx);
        let doc = Value::Mapping(doc);
        assert_eq!(doc["weights"]["torchscript"]["pytorch_version"], Value::from("1.13"));
        assert_eq!(doc["weights"]["keras_hdf5"]["tensorflow_version"], Value::from("2.1"));
    }
}
