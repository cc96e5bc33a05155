//! # Required Files
//!
//! Lists every file a description refers to, for callers that verify,
//! download or package them. No I/O happens here.

use std::collections::BTreeSet;

use rdf_core::{FieldPath, FileReference, Sha256Digest};

use crate::typed::{ArchitectureDescr, FileDescr, FileSource, TypedDescription};

#[derive(Default)]
struct Collector {
    seen: BTreeSet<(String, FieldPath)>,
    files: Vec<FileReference>,
}

impl Collector {
    fn add(&mut self, source: &FileSource, sha256: Option<&Sha256Digest>, field: FieldPath) {
        let location = source.as_str().to_string();
        if self.seen.insert((location.clone(), field.clone())) {
            self.files.push(FileReference {
                location,
                sha256: sha256.cloned(),
                field,
            });
        }
    }

    fn add_descr(&mut self, file: &FileDescr, field: FieldPath) {
        self.add(&file.source, file.sha256.as_ref(), field.key("source"));
    }
}

/// Files referenced by a description, in document order.
pub fn required_files(description: &TypedDescription) -> Vec<FileReference> {
    let mut files = Collector::default();
    let generic = description.generic();

    if let Some(doc) = &generic.documentation {
        files.add(doc, None, FieldPath::field("documentation"));
    }
    for (i, cover) in generic.covers.iter().enumerate() {
        files.add(cover, None, FieldPath::field("covers").index(i));
    }
    for (i, attachment) in generic.attachments.iter().enumerate() {
        files.add_descr(attachment, FieldPath::field("attachments").index(i));
    }

    if let Some(model) = description.as_model() {
        for (key, tensors) in [("inputs", &model.inputs), ("outputs", &model.outputs)] {
            for (i, tensor) in tensors.iter().enumerate() {
                let path = FieldPath::field(key).index(i);
                files.add_descr(&tensor.test_tensor, path.key("test_tensor"));
                if let Some(sample) = &tensor.sample_tensor {
                    files.add_descr(sample, path.key("sample_tensor"));
                }
            }
        }
        for (format, entry) in model.weights.entries() {
            let path = FieldPath::field("weights").key(format.as_str());
            files.add(&entry.source, entry.sha256.as_ref(), path.key("source"));
            if let Some(ArchitectureDescr::FromFile { source, sha256, .. }) = &entry.architecture {
                files.add(source, sha256.as_ref(), path.key("architecture").key("source"));
            }
            if let Some(deps) = &entry.dependencies {
                files.add_descr(deps, path.key("dependencies"));
            }
        }
    }

    if let Some(collection) = description.as_collection() {
        for (i, entry) in collection.collection.iter().enumerate() {
            if let Some(source) = &entry.source {
                files.add(source, None, FieldPath::field("collection").index(i).key("source"));
            }
        }
    }

    files.files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;
    use crate::registry::SchemaRegistry;
    use rdf_core::{RawDocument, ResourceTypeId};

    #[test]
    fn model_files_in_document_order() {
        let registry = SchemaRegistry::standard().unwrap();
        let doc = RawDocument::from_yaml_str(
            r#"
format_version: 0.5.3
type: model
name: m
description: d
authors: [{name: Jane}]
cite: [{text: t, url: https://example.com}]
license: MIT
documentation: README.md
covers: [cover.png]
inputs:
  - id: raw
    axes: [{type: space, id: x, size: 8}]
    test_tensor: {source: in.npy, sha256: 0000000000000000000000000000000000000000000000000000000000000000}
outputs:
  - id: out
    axes: [{type: space, id: x, size: 8}]
    test_tensor: {source: out.npy}
    sample_tensor: {source: out.png}
weights:
  pytorch_state_dict:
    source: https://zenodo.org/w.pt
    architecture: {source: unet.py, callable: UNet}
    dependencies: {source: environment.yaml}
"#,
        )
        .unwrap();
        let schema = registry.latest_schema(ResourceTypeId::Model).unwrap();
        let typed = materialize(doc, schema).unwrap();
        let files = required_files(&typed);
        let locations: Vec<&str> = files.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(
            locations,
            vec![
                "README.md",
                "cover.png",
                "in.npy",
                "out.npy",
                "out.png",
                "https://zenodo.org/w.pt",
                "unet.py",
                "environment.yaml",
            ]
        );
        assert!(files[2].sha256.is_some());
        assert_eq!(files[2].field.to_string(), "inputs[0].test_tensor.source");
        assert!(files[5].is_url());
    }

    #[test]
    fn collection_sources() {
        let registry = SchemaRegistry::standard().unwrap();
        let doc = RawDocument::from_yaml_str(
            "format_version: 0.3.0\ntype: collection\nname: c\ndescription: d\ncollection:\n  - {id: a, source: a/rdf.yaml}\n  - {id: b}\n",
        )
        .unwrap();
        let schema = registry.latest_schema(ResourceTypeId::Collection).unwrap();
        let typed = materialize(doc, schema).unwrap();
        let files = required_files(&typed);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].field.to_string(), "collection[0].source");
    }
}
