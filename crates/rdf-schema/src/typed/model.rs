//! # Model Description (format 0.5)
//!
//! Tensors, axes, processing steps and weights of a trained model.
//!
//! ## Axis Sizes
//!
//! [`AxisSize`] is an untagged union tried in declaration order:
//! a plain integer, `{min, step}`, or `{tensor_id, axis_id, scale, offset}`.
//! [`TensorDescr::shape_descr`] lowers the typed axes into the resolver's
//! input form; the resolver itself lives in `rdf-shape`.

use std::fmt;

use rdf_shape::{SizeExpr, TensorAxisDescr, TensorShapeDescr};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::file::{FileDescr, FileSource};
use super::generic::{Author, GenericDescr, LinkedResource};

// ─── Axes ───────────────────────────────────────────────────────────

/// Size of an index, space or time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSize {
    /// A concrete size.
    Fixed(u64),
    /// `min + k * step`.
    Parametrized {
        /// Smallest valid size.
        min: u64,
        /// Increment.
        step: u64,
    },
    /// `size(tensor_id.axis_id) * scale + 2 * offset`.
    Reference {
        /// Referenced tensor.
        tensor_id: String,
        /// Referenced axis.
        axis_id: String,
        /// Multiplier.
        #[serde(default = "unit_scale")]
        scale: f64,
        /// Margin added on each edge.
        #[serde(default)]
        offset: i64,
    },
}

impl AxisSize {
    fn to_expr(&self) -> SizeExpr {
        match self {
            Self::Fixed(n) => SizeExpr::fixed(*n),
            Self::Parametrized { min, step } => SizeExpr::parametrized(*min, *step),
            Self::Reference {
                tensor_id,
                axis_id,
                scale,
                offset,
            } => SizeExpr::reference(tensor_id, axis_id, *scale, *offset),
        }
    }
}

fn unit_scale() -> f64 {
    1.0
}

fn batch_id() -> String {
    "batch".to_string()
}

fn channel_id() -> String {
    "channel".to_string()
}

fn index_id() -> String {
    "index".to_string()
}

fn time_id() -> String {
    "time".to_string()
}

/// The batch axis. Its size is free unless pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAxis {
    /// Axis id.
    #[serde(default = "batch_id")]
    pub id: String,
    /// Fixed batch size, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The channel axis; its size is the number of channel names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAxis {
    /// Axis id.
    #[serde(default = "channel_id")]
    pub id: String,
    /// One name per channel.
    pub channel_names: Vec<String>,
}

/// A non-spatial index axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexAxis {
    /// Axis id.
    #[serde(default = "index_id")]
    pub id: String,
    /// Size.
    pub size: AxisSize,
}

/// A spatial or temporal axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAxis {
    /// Axis id.
    pub id: String,
    /// Size.
    pub size: AxisSize,
    /// Physical unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Physical size of one step along the axis.
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// Unreliable margin on each edge (outputs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<u64>,
}

/// The time axis; same layout as a space axis with a default id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    /// Axis id.
    #[serde(default = "time_id")]
    pub id: String,
    /// Size.
    pub size: AxisSize,
    /// Physical unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Physical duration of one step.
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// Unreliable margin on each edge (outputs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<u64>,
}

/// One axis of a tensor, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AxisDescr {
    /// Batch dimension.
    Batch(BatchAxis),
    /// Channel dimension.
    Channel(ChannelAxis),
    /// Index dimension.
    Index(IndexAxis),
    /// Spatial dimension.
    Space(SpatialAxis),
    /// Temporal dimension.
    Time(TimeAxis),
}

impl AxisDescr {
    /// Axis id.
    pub fn id(&self) -> &str {
        match self {
            Self::Batch(a) => &a.id,
            Self::Channel(a) => &a.id,
            Self::Index(a) => &a.id,
            Self::Space(a) => &a.id,
            Self::Time(a) => &a.id,
        }
    }

    /// Declared halo.
    pub fn halo(&self) -> Option<u64> {
        match self {
            Self::Space(a) => a.halo,
            Self::Time(a) => a.halo,
            _ => None,
        }
    }

    /// Size expression for the shape resolver. An unpinned batch axis
    /// resolves to 1.
    pub fn size_expr(&self) -> SizeExpr {
        match self {
            Self::Batch(a) => SizeExpr::fixed(a.size.unwrap_or(1)),
            Self::Channel(a) => SizeExpr::fixed(a.channel_names.len() as u64),
            Self::Index(a) => a.size.to_expr(),
            Self::Space(a) => a.size.to_expr(),
            Self::Time(a) => a.size.to_expr(),
        }
    }
}

// ─── Tensors ────────────────────────────────────────────────────────

fn default_range() -> Vec<Option<f64>> {
    vec![None, None]
}

fn float32() -> String {
    "float32".to_string()
}

/// Data type and value range of a tensor. `None` bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorData {
    /// Element type.
    #[serde(rename = "type", default = "float32")]
    pub data_type: String,
    /// `[min, max]`.
    #[serde(default = "default_range")]
    pub range: Vec<Option<f64>>,
}

impl Default for TensorData {
    fn default() -> Self {
        Self {
            data_type: float32(),
            range: default_range(),
        }
    }
}

/// A pre- or postprocessing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingDescr {
    /// Operation id.
    pub id: String,
    /// Operation arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,
}

impl ProcessingDescr {
    /// Axis ids named in `kwargs.axes`.
    pub fn axes(&self) -> Vec<&str> {
        self.kwargs
            .as_ref()
            .and_then(|k| k.get("axes"))
            .and_then(Value::as_sequence)
            .map(|axes| axes.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// An input or output tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDescr {
    /// Tensor id, unique among inputs and outputs.
    pub id: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Axes in memory order.
    pub axes: Vec<AxisDescr>,
    /// Data type and range.
    #[serde(default)]
    pub data: TensorData,
    /// Example tensor used for testing.
    pub test_tensor: FileDescr,
    /// Image illustrating the tensor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_tensor: Option<FileDescr>,
    /// Input processing (inputs only).
    #[serde(default)]
    pub preprocessing: Vec<ProcessingDescr>,
    /// Output processing (outputs only).
    #[serde(default)]
    pub postprocessing: Vec<ProcessingDescr>,
}

impl TensorDescr {
    /// Lower the axes into the resolver's input form.
    pub fn shape_descr(&self) -> TensorShapeDescr {
        let axes = self
            .axes
            .iter()
            .map(|axis| TensorAxisDescr {
                id: axis.id().to_string(),
                size: axis.size_expr(),
                halo: axis.halo(),
            })
            .collect();
        TensorShapeDescr::new(&self.id, axes)
    }

    /// Axis by id.
    pub fn axis(&self, id: &str) -> Option<&AxisDescr> {
        self.axes.iter().find(|a| a.id() == id)
    }
}

// ─── Weights ────────────────────────────────────────────────────────

/// Supported weight formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsFormat {
    /// Keras HDF5.
    KerasHdf5,
    /// ONNX.
    Onnx,
    /// PyTorch state dict plus architecture.
    PytorchStateDict,
    /// TensorFlow.js.
    TensorflowJs,
    /// TensorFlow SavedModel bundle.
    TensorflowSavedModelBundle,
    /// TorchScript.
    Torchscript,
}

impl WeightsFormat {
    /// Every format, in declaration order.
    pub const ALL: [WeightsFormat; 6] = [
        Self::KerasHdf5,
        Self::Onnx,
        Self::PytorchStateDict,
        Self::TensorflowJs,
        Self::TensorflowSavedModelBundle,
        Self::Torchscript,
    ];

    /// Key under `weights`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KerasHdf5 => "keras_hdf5",
            Self::Onnx => "onnx",
            Self::PytorchStateDict => "pytorch_state_dict",
            Self::TensorflowJs => "tensorflow_js",
            Self::TensorflowSavedModelBundle => "tensorflow_saved_model_bundle",
            Self::Torchscript => "torchscript",
        }
    }
}

impl fmt::Display for WeightsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the network architecture of a state dict comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchitectureDescr {
    /// A source file defining `callable`.
    FromFile {
        /// Source file.
        source: FileSource,
        /// Name of the class or function.
        callable: String,
        /// Digest of the source file.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<rdf_core::Sha256Digest>,
        /// Constructor arguments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kwargs: Option<Value>,
    },
    /// An importable module defining `callable`.
    FromLibrary {
        /// Module path.
        import_from: String,
        /// Name of the class or function.
        callable: String,
        /// Constructor arguments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kwargs: Option<Value>,
    },
}

/// One weights entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsEntry {
    /// Weights file.
    pub source: FileSource,
    /// Digest of the weights file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<rdf_core::Sha256Digest>,
    /// Who converted or trained these weights.
    #[serde(default)]
    pub authors: Vec<Author>,
    /// Format these weights were converted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<WeightsFormat>,
    /// Network architecture (`pytorch_state_dict` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<ArchitectureDescr>,
    /// Environment file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<FileDescr>,
    /// PyTorch version (`pytorch_state_dict`, `torchscript`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pytorch_version: Option<String>,
    /// TensorFlow version (`keras_hdf5`, `tensorflow_*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensorflow_version: Option<String>,
    /// ONNX opset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opset_version: Option<u64>,
}

/// Weights, at most one entry per format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightsDescr {
    /// Keras HDF5 weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keras_hdf5: Option<WeightsEntry>,
    /// ONNX weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onnx: Option<WeightsEntry>,
    /// PyTorch state dict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pytorch_state_dict: Option<WeightsEntry>,
    /// TensorFlow.js weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensorflow_js: Option<WeightsEntry>,
    /// TensorFlow SavedModel bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensorflow_saved_model_bundle: Option<WeightsEntry>,
    /// TorchScript weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torchscript: Option<WeightsEntry>,
}

impl WeightsDescr {
    /// Entry of one format.
    pub fn get(&self, format: WeightsFormat) -> Option<&WeightsEntry> {
        match format {
            WeightsFormat::KerasHdf5 => self.keras_hdf5.as_ref(),
            WeightsFormat::Onnx => self.onnx.as_ref(),
            WeightsFormat::PytorchStateDict => self.pytorch_state_dict.as_ref(),
            WeightsFormat::TensorflowJs => self.tensorflow_js.as_ref(),
            WeightsFormat::TensorflowSavedModelBundle => self.tensorflow_saved_model_bundle.as_ref(),
            WeightsFormat::Torchscript => self.torchscript.as_ref(),
        }
    }

    /// Present entries in declaration order.
    pub fn entries(&self) -> Vec<(WeightsFormat, &WeightsEntry)> {
        WeightsFormat::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|e| (f, e)))
            .collect()
    }

    /// Present formats in declaration order.
    pub fn formats(&self) -> Vec<WeightsFormat> {
        self.entries().into_iter().map(|(f, _)| f).collect()
    }
}

// ─── Model ──────────────────────────────────────────────────────────

/// A named run mode with arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMode {
    /// Mode name.
    pub name: String,
    /// Mode arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,
}

/// Model-only fields, deserialized alongside [`GenericDescr`].
#[derive(Debug, Deserialize)]
pub(crate) struct ModelFields {
    pub inputs: Vec<TensorDescr>,
    pub outputs: Vec<TensorDescr>,
    pub weights: WeightsDescr,
    #[serde(default)]
    pub training_data: Option<LinkedResource>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub run_mode: Option<RunMode>,
    #[serde(default)]
    pub packaged_by: Vec<Author>,
    #[serde(default)]
    pub parent: Option<LinkedResource>,
}

/// Model description (format 0.5.3).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescr {
    /// Generic fields.
    #[serde(flatten)]
    pub generic: GenericDescr,
    /// Input tensors.
    pub inputs: Vec<TensorDescr>,
    /// Output tensors.
    pub outputs: Vec<TensorDescr>,
    /// Weights per format.
    pub weights: WeightsDescr,
    /// Dataset the model was trained on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_data: Option<LinkedResource>,
    /// Creation time (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Custom run mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_mode: Option<RunMode>,
    /// Who packaged the model.
    pub packaged_by: Vec<Author>,
    /// Model this one was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<LinkedResource>,
}

impl ModelDescr {
    pub(crate) fn from_parts(generic: GenericDescr, fields: ModelFields) -> Self {
        Self {
            generic,
            inputs: fields.inputs,
            outputs: fields.outputs,
            weights: fields.weights,
            training_data: fields.training_data,
            timestamp: fields.timestamp,
            run_mode: fields.run_mode,
            packaged_by: fields.packaged_by,
            parent: fields.parent,
        }
    }

    /// Inputs followed by outputs.
    pub fn tensors(&self) -> impl Iterator<Item = &TensorDescr> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Resolver input for all tensors.
    pub fn tensor_shapes(&self) -> Vec<TensorShapeDescr> {
        self.tensors().map(TensorDescr::shape_descr).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_size_arms_in_order() {
        let fixed: AxisSize = serde_yaml::from_str("64").unwrap();
        assert_eq!(fixed, AxisSize::Fixed(64));
        let param: AxisSize = serde_yaml::from_str("{min: 16, step: 8}").unwrap();
        assert_eq!(param, AxisSize::Parametrized { min: 16, step: 8 });
        let reference: AxisSize =
            serde_yaml::from_str("{tensor_id: raw, axis_id: x, offset: -4}").unwrap();
        assert_eq!(
            reference,
            AxisSize::Reference {
                tensor_id: "raw".to_string(),
                axis_id: "x".to_string(),
                scale: 1.0,
                offset: -4,
            }
        );
    }

    #[test]
    fn axes_tagged_by_type() {
        let axes: Vec<AxisDescr> = serde_yaml::from_str(
            "- type: batch\n- {type: channel, channel_names: [r, g, b]}\n- {type: space, id: y, size: 64, halo: 8}\n",
        )
        .unwrap();
        assert_eq!(axes[0].id(), "batch");
        assert_eq!(axes[1].size_expr(), SizeExpr::fixed(3));
        assert_eq!(axes[2].id(), "y");
        assert_eq!(axes[2].halo(), Some(8));
    }

    #[test]
    fn weights_formats_in_declaration_order() {
        let weights: WeightsDescr = serde_yaml::from_str(
            "torchscript: {source: w.pt}\nonnx: {source: w.onnx, opset_version: 15}\n",
        )
        .unwrap();
        assert_eq!(
            weights.formats(),
            vec![WeightsFormat::Onnx, WeightsFormat::Torchscript]
        );
    }

    #[test]
    fn architecture_union() {
        let a: ArchitectureDescr =
            serde_yaml::from_str("{source: unet.py, callable: UNet}").unwrap();
        assert!(matches!(a, ArchitectureDescr::FromFile { .. }));
        let a: ArchitectureDescr =
            serde_yaml::from_str("{import_from: nets.unet, callable: UNet}").unwrap();
        assert!(matches!(a, ArchitectureDescr::FromLibrary { .. }));
    }

    #[test]
    fn processing_axes_from_kwargs() {
        let p: ProcessingDescr =
            serde_yaml::from_str("{id: zero_mean_unit_variance, kwargs: {axes: [x, y]}}").unwrap();
        assert_eq!(p.axes(), vec!["x", "y"]);
        let p: ProcessingDescr = serde_yaml::from_str("{id: sigmoid}").unwrap();
        assert!(p.axes().is_empty());
    }
}
