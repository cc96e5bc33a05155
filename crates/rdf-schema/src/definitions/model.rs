//! # Model Schemas
//!
//! Three structural eras:
//!
//! - **0.3.x**: tensors carry `name`, an axes letter string, `data_type`,
//!   `data_range` and `shape`; output shapes reference an input through
//!   `reference_input`. Test and sample data are listed at the top level.
//!   The PyTorch architecture lives in top-level `source`/`sha256`/`kwargs`.
//!   0.3.0 – 0.3.1 use singular `test_input`/`test_output`.
//! - **0.4.x**: `reference_input` becomes `reference_tensor`; the
//!   architecture moves into `weights.pytorch_state_dict`.
//! - **0.5.x**: tensors carry `id`, axis objects with size expressions and
//!   a `data` description; weights are typed per format. 0.5.0 – 0.5.2
//!   accept numeric framework versions.

use rdf_core::VersionTag;

use super::generic::{self, LegacyStyle};
use super::{
    author, empty_list, file_descr, linked_resource, override_fields, require,
};
use crate::checks;
use crate::schema::{FieldSpec, SchemaDescr, StrFormat, ValueShape};
use crate::typed::WeightsFormat;

/// Element types a tensor may declare.
pub const DATA_TYPES: &[&str] = &[
    "bool", "float32", "float64", "uint8", "int8", "uint16", "int16", "uint32", "int32", "uint64",
    "int64",
];

/// Weight format keys.
pub const WEIGHTS_FORMATS: &[&str] = &[
    "keras_hdf5",
    "onnx",
    "pytorch_state_dict",
    "tensorflow_js",
    "tensorflow_saved_model_bundle",
    "torchscript",
];

const fn v(major: u32, minor: u32, patch: u32) -> VersionTag {
    VersionTag::new(major, minor, patch)
}

/// Model schema at `version`.
pub fn schema(version: VersionTag) -> SchemaDescr {
    let fields = if version < v(0, 5, 0) {
        legacy_fields(version)
    } else {
        latest_fields(version)
    };
    SchemaDescr::new(rdf_core::ResourceTypeId::Model, version, fields)
}

// ─── 0.3 / 0.4 ──────────────────────────────────────────────────────

fn legacy_processing() -> ValueShape {
    ValueShape::list(ValueShape::Object(vec![
        FieldSpec::required("name", ValueShape::string()),
        FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
    ]))
}

fn legacy_tensor(reference_key: &'static str, output: bool) -> ValueShape {
    let explicit = ValueShape::list(ValueShape::UInt);
    let shape = if output {
        ValueShape::union(vec![
            ("explicit shape", explicit),
            (
                "implicit output shape",
                ValueShape::Object(vec![
                    FieldSpec::required(reference_key, ValueShape::string()),
                    FieldSpec::required(
                        "scale",
                        ValueShape::list(ValueShape::union(vec![
                            ("factor", ValueShape::Number),
                            ("new axis", ValueShape::Null),
                        ])),
                    ),
                    FieldSpec::required("offset", ValueShape::list(ValueShape::Number)),
                ]),
            ),
        ])
    } else {
        ValueShape::union(vec![
            ("explicit shape", explicit),
            (
                "parametrized input shape",
                ValueShape::Object(vec![
                    FieldSpec::required("min", ValueShape::list(ValueShape::UInt)),
                    FieldSpec::required("step", ValueShape::list(ValueShape::UInt)),
                ]),
            ),
        ])
    };

    let mut fields = vec![
        FieldSpec::required("name", ValueShape::string()),
        FieldSpec::optional("description", ValueShape::string()),
        FieldSpec::required("axes", ValueShape::string()),
        FieldSpec::required("data_type", ValueShape::string()),
        FieldSpec::optional("data_range", ValueShape::list(ValueShape::Number)),
        FieldSpec::required("shape", shape),
    ];
    if output {
        fields.push(FieldSpec::optional("halo", ValueShape::list(ValueShape::UInt)));
        fields.push(FieldSpec::optional("postprocessing", legacy_processing()));
    } else {
        fields.push(FieldSpec::optional("preprocessing", legacy_processing()));
    }
    ValueShape::Object(fields)
}

fn number_or_string() -> ValueShape {
    ValueShape::union(vec![
        ("string", ValueShape::string()),
        ("number", ValueShape::Number),
    ])
}

fn legacy_weights_entry() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("source", ValueShape::string()),
        FieldSpec::optional("sha256", ValueShape::string()),
        FieldSpec::optional("authors", ValueShape::list(ValueShape::Opaque)),
        FieldSpec::optional("parent", ValueShape::string()),
        FieldSpec::optional("architecture", ValueShape::string()),
        FieldSpec::optional("architecture_sha256", ValueShape::string()),
        FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
        FieldSpec::optional("dependencies", ValueShape::string()),
        FieldSpec::optional("pytorch_version", number_or_string()),
        FieldSpec::optional("tensorflow_version", number_or_string()),
        FieldSpec::optional("opset_version", ValueShape::UInt),
        FieldSpec::optional("attachments", ValueShape::Opaque),
    ])
}

fn singular_or_list() -> ValueShape {
    ValueShape::union(vec![
        ("single file", ValueShape::string()),
        ("file list", ValueShape::list(ValueShape::string())),
    ])
}

fn legacy_fields(version: VersionTag) -> Vec<FieldSpec> {
    let base = generic::legacy_fields(LegacyStyle {
        author_strings: version < v(0, 3, 1),
        bare_attachments: true,
    });
    let base = require(base, &["authors", "cite", "documentation", "license"]);
    let reference_key = if version < v(0, 4, 0) {
        "reference_input"
    } else {
        "reference_tensor"
    };

    let mut extra = vec![
        FieldSpec::required(
            "inputs",
            ValueShape::list(legacy_tensor(reference_key, false)),
        ),
        FieldSpec::required(
            "outputs",
            ValueShape::list(legacy_tensor(reference_key, true)),
        ),
        FieldSpec::required("weights", ValueShape::map(legacy_weights_entry())),
        FieldSpec::required("timestamp", ValueShape::string()),
        FieldSpec::optional("run_mode", ValueShape::Opaque),
        FieldSpec::optional("packaged_by", ValueShape::list(ValueShape::Opaque)),
        FieldSpec::optional("parent", ValueShape::Opaque),
        FieldSpec::optional("training_data", ValueShape::Opaque),
    ];

    if version < v(0, 3, 2) {
        extra.push(FieldSpec::required("test_input", singular_or_list()));
        extra.push(FieldSpec::required("test_output", singular_or_list()));
        extra.push(FieldSpec::optional("sample_input", singular_or_list()));
        extra.push(FieldSpec::optional("sample_output", singular_or_list()));
    } else {
        let files = || ValueShape::list(ValueShape::string());
        extra.push(FieldSpec::required("test_inputs", files()));
        extra.push(FieldSpec::required("test_outputs", files()));
        extra.push(FieldSpec::optional("sample_inputs", files()));
        extra.push(FieldSpec::optional("sample_outputs", files()));
    }

    if version < v(0, 4, 0) {
        extra.push(FieldSpec::optional("language", ValueShape::string()));
        extra.push(FieldSpec::optional("framework", ValueShape::string()));
        extra.push(FieldSpec::optional("source", ValueShape::string()));
        extra.push(FieldSpec::optional("sha256", ValueShape::string()));
        extra.push(FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)));
        extra.push(FieldSpec::optional("dependencies", ValueShape::string()));
    }

    override_fields(base, extra)
}

// ─── 0.5 ────────────────────────────────────────────────────────────

fn axis_size() -> ValueShape {
    ValueShape::union(vec![
        ("fixed size", ValueShape::UInt),
        (
            "parametrized size",
            ValueShape::Object(vec![
                FieldSpec::required("min", ValueShape::UInt),
                FieldSpec::required("step", ValueShape::UInt),
            ]),
        ),
        (
            "reference size",
            ValueShape::Object(vec![
                FieldSpec::required("tensor_id", ValueShape::string()),
                FieldSpec::required("axis_id", ValueShape::string()),
                FieldSpec::optional("scale", ValueShape::Number),
                FieldSpec::optional("offset", ValueShape::Int),
            ]),
        ),
    ])
}

fn axis(output: bool) -> ValueShape {
    let tag = |literal: &'static [&'static str]| {
        FieldSpec::required("type", ValueShape::one_of(literal))
    };
    let id = |required: bool| {
        let spec = if required {
            FieldSpec::required("id", ValueShape::string())
        } else {
            FieldSpec::optional("id", ValueShape::string())
        };
        spec.validated(checks::axis_id)
    };
    let spatial = |literal: &'static [&'static str], id_required: bool| {
        let mut fields = vec![
            tag(literal),
            id(id_required),
            FieldSpec::required("size", axis_size()),
            FieldSpec::optional("unit", ValueShape::string()),
            FieldSpec::optional("scale", ValueShape::Number).validated(checks::positive_scale),
        ];
        if output {
            fields.push(FieldSpec::optional("halo", ValueShape::UInt));
        }
        ValueShape::Object(fields)
    };

    ValueShape::union(vec![
        (
            "batch axis",
            ValueShape::Object(vec![
                tag(&["batch"]),
                id(false),
                FieldSpec::optional("size", ValueShape::UInt),
            ]),
        ),
        (
            "channel axis",
            ValueShape::Object(vec![
                tag(&["channel"]),
                id(false),
                FieldSpec::required("channel_names", ValueShape::list(ValueShape::string()))
                    .validated(checks::channel_names),
            ]),
        ),
        (
            "index axis",
            ValueShape::Object(vec![
                tag(&["index"]),
                id(false),
                FieldSpec::required("size", axis_size()),
            ]),
        ),
        ("space axis", spatial(&["space"], true)),
        ("time axis", spatial(&["time"], false)),
    ])
}

fn processing() -> ValueShape {
    ValueShape::list(ValueShape::Object(vec![
        FieldSpec::required("id", ValueShape::string()).validated(checks::processing_id),
        FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
    ]))
}

fn tensor_data() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::optional("type", ValueShape::one_of(DATA_TYPES))
            .with_default(serde_yaml::Value::from("float32")),
        FieldSpec::optional(
            "range",
            ValueShape::list(ValueShape::union(vec![
                ("bound", ValueShape::Number),
                ("unbounded", ValueShape::Null),
            ])),
        )
        .validated(checks::data_range),
    ])
}

fn default_data() -> serde_yaml::Value {
    let mut data = serde_yaml::Mapping::new();
    data.insert("type".into(), "float32".into());
    data.insert(
        "range".into(),
        serde_yaml::Value::Sequence(vec![serde_yaml::Value::Null, serde_yaml::Value::Null]),
    );
    serde_yaml::Value::Mapping(data)
}

fn tensor(output: bool) -> ValueShape {
    let processing_key = if output { "postprocessing" } else { "preprocessing" };
    ValueShape::Object(vec![
        FieldSpec::required("id", ValueShape::string()).validated(checks::tensor_id),
        FieldSpec::optional("description", ValueShape::string()),
        FieldSpec::required("axes", ValueShape::list(axis(output))).validated(checks::axes),
        FieldSpec::optional("data", tensor_data()).with_default(default_data()),
        FieldSpec::required("test_tensor", file_descr()),
        FieldSpec::optional("sample_tensor", file_descr()),
        FieldSpec::optional(processing_key, processing()).with_default(empty_list()),
    ])
}

fn architecture() -> ValueShape {
    ValueShape::union(vec![
        (
            "architecture from file",
            ValueShape::Object(vec![
                FieldSpec::required("source", ValueShape::file_source()),
                FieldSpec::required("callable", ValueShape::string()),
                FieldSpec::optional("sha256", ValueShape::Str(StrFormat::Sha256)),
                FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
            ]),
        ),
        (
            "architecture from library",
            ValueShape::Object(vec![
                FieldSpec::required("import_from", ValueShape::string()),
                FieldSpec::required("callable", ValueShape::string()),
                FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
            ]),
        ),
    ])
}

fn weights_entry(format: WeightsFormat, version: VersionTag) -> ValueShape {
    let framework_version = || {
        if version < v(0, 5, 3) {
            number_or_string()
        } else {
            ValueShape::string()
        }
    };
    let mut fields = vec![
        FieldSpec::required("source", ValueShape::file_source()),
        FieldSpec::optional("sha256", ValueShape::Str(StrFormat::Sha256)),
        FieldSpec::optional("authors", ValueShape::list(author())).with_default(empty_list()),
        FieldSpec::optional("parent", ValueShape::one_of(WEIGHTS_FORMATS)),
        FieldSpec::optional("dependencies", file_descr()),
    ];
    match format {
        WeightsFormat::PytorchStateDict => {
            fields.push(FieldSpec::required("architecture", architecture()));
            fields.push(FieldSpec::optional("pytorch_version", framework_version()));
        }
        WeightsFormat::Torchscript => {
            fields.push(FieldSpec::optional("pytorch_version", framework_version()));
        }
        WeightsFormat::Onnx => {
            fields.push(FieldSpec::optional("opset_version", ValueShape::UInt));
        }
        WeightsFormat::KerasHdf5
        | WeightsFormat::TensorflowJs
        | WeightsFormat::TensorflowSavedModelBundle => {
            fields.push(FieldSpec::optional("tensorflow_version", framework_version()));
        }
    }
    ValueShape::Object(fields)
}

fn weights(version: VersionTag) -> ValueShape {
    ValueShape::Object(
        WeightsFormat::ALL
            .into_iter()
            .map(|format| FieldSpec::optional(format.as_str(), weights_entry(format, version)))
            .collect(),
    )
}

fn latest_fields(version: VersionTag) -> Vec<FieldSpec> {
    let base = require(
        generic::latest_fields(),
        &["authors", "cite", "documentation", "license"],
    );
    override_fields(
        base,
        vec![
            FieldSpec::required("inputs", ValueShape::list(tensor(false))),
            FieldSpec::required("outputs", ValueShape::list(tensor(true))),
            FieldSpec::required("weights", weights(version)),
            FieldSpec::optional("training_data", linked_resource()),
            FieldSpec::optional("timestamp", ValueShape::string()).validated(checks::timestamp),
            FieldSpec::optional(
                "run_mode",
                ValueShape::Object(vec![
                    FieldSpec::required("name", ValueShape::string()),
                    FieldSpec::optional("kwargs", ValueShape::map(ValueShape::Opaque)),
                ]),
            ),
            FieldSpec::optional("packaged_by", ValueShape::list(author()))
                .with_default(empty_list()),
            FieldSpec::optional("parent", linked_resource()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::RawDocument;

    const LATEST_MODEL: &str = r#"
format_version: 0.5.3
type: model
name: UNet
description: segmentation
authors: [{name: Jane Doe}]
cite: [{text: paper, doi: 10.1000/xyz}]
license: MIT
documentation: README.md
inputs:
  - id: raw
    axes:
      - type: batch
      - {type: channel, channel_names: [c0]}
      - {type: space, id: y, size: {min: 64, step: 16}}
      - {type: space, id: x, size: {min: 64, step: 16}}
    test_tensor: {source: test_input.npy}
outputs:
  - id: probability
    axes:
      - type: batch
      - {type: channel, channel_names: [p0]}
      - {type: space, id: y, size: {tensor_id: raw, axis_id: y}, halo: 8}
      - {type: space, id: x, size: {tensor_id: raw, axis_id: x}, halo: 8}
    test_tensor: {source: test_output.npy}
weights:
  torchscript: {source: weights.pt, pytorch_version: "1.13"}
"#;

    #[test]
    fn latest_model_conforms() {
        let doc = RawDocument::from_yaml_str(LATEST_MODEL).unwrap();
        let out = schema(v(0, 5, 3)).conform(&doc).unwrap();
        let data = out["inputs"][0]["data"].clone();
        assert_eq!(data["type"], serde_yaml::Value::from("float32"));
    }

    #[test]
    fn numeric_framework_versions_until_0_5_2() {
        let numeric = LATEST_MODEL.replace("pytorch_version: \"1.13\"", "pytorch_version: 1.13");
        let doc = RawDocument::from_yaml_str(&numeric).unwrap();
        assert!(schema(v(0, 5, 2)).check(&doc).is_ok());
        assert!(schema(v(0, 5, 3)).check(&doc).is_err());
    }

    #[test]
    fn state_dict_requires_architecture() {
        let doc = RawDocument::from_yaml_str(&LATEST_MODEL.replace(
            "torchscript: {source: weights.pt, pytorch_version: \"1.13\"}",
            "pytorch_state_dict: {source: weights.pt}",
        ))
        .unwrap();
        let err = schema(v(0, 5, 3)).check(&doc).unwrap_err();
        assert_eq!(
            err.violations()[0].path.to_string(),
            "weights.pytorch_state_dict.architecture"
        );
    }

    #[test]
    fn legacy_reference_key_changes_in_0_4() {
        let s3 = schema(v(0, 3, 6));
        let s4 = schema(v(0, 4, 0));
        assert!(s3.declares("language"));
        assert!(!s4.declares("language"));
        assert!(s3.declares("test_inputs"));
        assert!(schema(v(0, 3, 0)).declares("test_input"));
    }
}
