//! Collection chain.

use rdf_core::ResourceTypeId;
use rdf_schema::definitions::collection::LEGACY_MEMBER_KEYS;
use serde_yaml::{Mapping, Value};

use super::generic::{author_objects, to_latest_generic, wrap_attachments};
use super::{expand, v, version_bump, StepRow};
use crate::edit::{each_mapping, rename, take};
use crate::step::{MigrationStep, StepContext};

const AUTHOR_OBJECTS: &str = "Author entries given as plain strings become {name: ...}.";
const MERGE_MEMBERS: &str = "A bare attachments list becomes {files: [...]}; members listed under \
application, model, dataset or notebook move into collection with a matching type.";
const BUMP_0_2_3: &str = "No structural change.";
const TO_0_3_0: &str = "Generic 0.3.0 changes; collection[].rdf_source is renamed source.";

const ROWS: &[StepRow] = &[
    (v(0, 2, 0), v(0, 2, 1), AUTHOR_OBJECTS, author_objects),
    (v(0, 2, 1), v(0, 2, 2), MERGE_MEMBERS, merge_members),
    (v(0, 2, 2), v(0, 2, 3), BUMP_0_2_3, version_bump),
    (v(0, 2, 3), v(0, 3, 0), TO_0_3_0, to_latest),
];

/// Collection steps.
pub fn steps() -> Vec<MigrationStep> {
    expand(ResourceTypeId::Collection, ROWS)
}

fn merge_members(doc: &mut Mapping, ctx: &mut StepContext) {
    wrap_attachments(doc, ctx);

    let mut merged = match take(doc, "collection") {
        Some(Value::Sequence(items)) => items,
        Some(other) if !other.is_null() => vec![other],
        _ => Vec::new(),
    };
    let mut moved = false;
    for key in LEGACY_MEMBER_KEYS {
        let Some(Value::Sequence(members)) = take(doc, key) else {
            continue;
        };
        moved = true;
        for mut member in members {
            if let Some(entry) = member.as_mapping_mut() {
                if !entry.contains_key("type") {
                    entry.insert(Value::from("type"), Value::from(key));
                }
            }
            merged.push(member);
        }
    }
    if moved || !merged.is_empty() {
        doc.insert(Value::from("collection"), Value::Sequence(merged));
    }
}

fn to_latest(doc: &mut Mapping, ctx: &mut StepContext) {
    to_latest_generic(doc, ctx);
    each_mapping(doc, "collection", |_, entry| {
        rename(entry, "rdf_source", "source");
    });
}
