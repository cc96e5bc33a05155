//! Generic chain, shared by dataset, application and notebook documents.
//! The edits are reused by the collection and model chains.

use rdf_core::{FieldPath, ResourceTypeId};
use rdf_schema::checks::bare_doi;
use serde_yaml::{Mapping, Value};

use super::{expand, v, version_bump, StepRow};
use crate::edit::{self, each_mapping, mapping, set_default, strings_to_objects, take};
use crate::step::{MigrationStep, StepContext};

const AUTHOR_OBJECTS: &str = "Author entries given as plain strings become {name: ...}.";
const WRAP_ATTACHMENTS: &str = "A bare attachments list becomes {files: [...]}.";
const BUMP_0_2_3: &str = "No structural change.";
const TO_0_3_0: &str = "attachments.files becomes a list of {source}; download_url and \
rdf_source are dropped; tags default to []; DOI URLs in cite are reduced to bare DOIs; \
type 'rdf' becomes 'generic'.";

const ROWS: &[StepRow] = &[
    (v(0, 2, 0), v(0, 2, 1), AUTHOR_OBJECTS, author_objects),
    (v(0, 2, 1), v(0, 2, 2), WRAP_ATTACHMENTS, wrap_attachments),
    (v(0, 2, 2), v(0, 2, 3), BUMP_0_2_3, version_bump),
    (v(0, 2, 3), v(0, 3, 0), TO_0_3_0, to_latest_generic),
];

/// Steps of one generic-family type.
pub fn steps(resource_type: ResourceTypeId) -> Vec<MigrationStep> {
    expand(resource_type, ROWS)
}

// ─── Edits ──────────────────────────────────────────────────────────

/// Author strings become `{name}` objects.
pub(crate) fn author_objects(doc: &mut Mapping, _: &mut StepContext) {
    strings_to_objects(doc, "authors", "name");
}

/// `attachments: [a, b]` becomes `attachments: {files: [a, b]}`.
pub(crate) fn wrap_attachments(doc: &mut Mapping, _: &mut StepContext) {
    if let Some(attachments) = doc.get_mut("attachments") {
        if attachments.is_sequence() {
            let files = attachments.clone();
            *attachments = Value::Mapping(mapping([("files", files)]));
        }
    }
}

/// Changes shared by every type moving to the 0.3.0 generic layout.
pub(crate) fn to_latest_generic(doc: &mut Mapping, ctx: &mut StepContext) {
    if doc.get("type").and_then(Value::as_str) == Some("rdf") {
        doc.insert(Value::from("type"), Value::from("generic"));
    }

    attachments_to_file_descrs(doc, ctx);

    for key in ["download_url", "rdf_source"] {
        if let Some(value) = take(doc, key) {
            if !value.is_null() {
                ctx.note(FieldPath::field(key), "dropped; the field no longer exists");
            }
        }
    }

    set_default(doc, "tags", Value::Sequence(Vec::new()));
    normalize_cite_dois(doc);
}

fn attachments_to_file_descrs(doc: &mut Mapping, ctx: &mut StepContext) {
    let Some(attachments) = doc.get_mut("attachments") else {
        return;
    };
    let files = match attachments {
        Value::Sequence(items) => std::mem::take(items),
        Value::Mapping(map) => {
            let files = match edit::take(map, "files") {
                Some(Value::Sequence(items)) => items,
                _ => Vec::new(),
            };
            for key in map.keys().filter_map(Value::as_str) {
                ctx.note(
                    FieldPath::field("attachments").key(key),
                    "dropped; only file attachments are kept",
                );
            }
            files
        }
        _ => return,
    };
    *attachments = Value::Sequence(
        files
            .into_iter()
            .map(|file| match file {
                Value::String(source) => Value::Mapping(mapping([("source", Value::from(source))])),
                other => other,
            })
            .collect(),
    );
}

/// `cite[].doi` given as a doi.org URL becomes the bare DOI.
pub(crate) fn normalize_cite_dois(doc: &mut Mapping) {
    each_mapping(doc, "cite", |_, entry| {
        if let Some(Value::String(doi)) = entry.get_mut("doi") {
            let bare = bare_doi(doi).to_string();
            *doi = bare;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::VersionTag;

    fn run(apply: crate::step::StepFn, yaml: &str) -> (Mapping, Vec<rdf_core::MigrationNote>) {
        let step = MigrationStep::new(
            ResourceTypeId::Generic,
            VersionTag::new(0, 2, 3),
            VersionTag::new(0, 3, 0),
            "",
            apply,
        );
        step.run(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn latest_layout() {
        let (doc, notes) = run(
            to_latest_generic,
            "type: rdf\nattachments: {files: [a.txt, b.txt], zenodo: x}\ndownload_url: https://x.org/d.zip\ncite: [{text: t, doi: 'https://doi.org/10.1/abc'}]\n",
        );
        let expected: Mapping = serde_yaml::from_str(
            "type: generic\nattachments: [{source: a.txt}, {source: b.txt}]\ncite: [{text: t, doi: 10.1/abc}]\ntags: []\n",
        )
        .unwrap();
        assert_eq!(doc, expected);
        let fields: Vec<String> = notes.iter().map(|n| n.field.to_string()).collect();
        assert_eq!(fields, vec!["attachments.zenodo", "download_url"]);
    }

    #[test]
    fn bare_attachment_list() {
        let (doc, _) = run(wrap_attachments, "attachments: [a.txt]\n");
        let expected: Mapping = serde_yaml::from_str("attachments: {files: [a.txt]}\n").unwrap();
        assert_eq!(doc, expected);
        let (again, _) = run(wrap_attachments, "attachments: {files: [a.txt]}\n");
        assert_eq!(again, expected);
    }
}
