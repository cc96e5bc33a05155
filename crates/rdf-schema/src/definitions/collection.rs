//! Collection schemas.
//!
//! - 0.2.0 – 0.2.1: members may also be listed under the legacy
//!   `application`, `model`, `dataset` and `notebook` keys.
//! - 0.2.2 – 0.2.3: all members live in `collection` and carry a `type`;
//!   member descriptions are referenced through `rdf_source`.
//! - 0.3.0: `rdf_source` is renamed `source`.

use rdf_core::{ResourceTypeId, VersionTag};

use super::generic::{self, LegacyStyle};
use super::{empty_list, override_fields};
use crate::checks;
use crate::schema::{FieldSpec, SchemaDescr, ValueShape};

/// Type literals a collection member may declare.
pub const MEMBER_TYPES: &[&str] = &[
    "application",
    "collection",
    "dataset",
    "generic",
    "model",
    "notebook",
    "rdf",
];

/// Keys that held members before they were merged into `collection`.
pub const LEGACY_MEMBER_KEYS: [&str; 4] = ["application", "model", "dataset", "notebook"];

/// Collection schema at `version`.
pub fn schema(version: VersionTag) -> SchemaDescr {
    SchemaDescr::new(ResourceTypeId::Collection, version, fields(version))
}

fn fields(version: VersionTag) -> Vec<FieldSpec> {
    if version >= VersionTag::new(0, 3, 0) {
        return override_fields(
            generic::latest_fields(),
            vec![FieldSpec::optional("collection", ValueShape::list(latest_entry()))
                .with_default(empty_list())],
        );
    }

    let base = generic::legacy_fields(LegacyStyle {
        author_strings: version < VersionTag::new(0, 2, 1),
        bare_attachments: version < VersionTag::new(0, 2, 2),
    });
    let mut extra = vec![FieldSpec::optional(
        "collection",
        ValueShape::list(legacy_entry(version >= VersionTag::new(0, 2, 2))),
    )];
    if version < VersionTag::new(0, 2, 2) {
        for key in LEGACY_MEMBER_KEYS {
            extra.push(FieldSpec::optional(
                key,
                ValueShape::list(ValueShape::map(ValueShape::Opaque)),
            ));
        }
    }
    override_fields(base, extra)
}

fn legacy_entry(typed: bool) -> ValueShape {
    let mut fields = vec![
        FieldSpec::optional("id", ValueShape::string()),
        FieldSpec::optional("rdf_source", ValueShape::string()),
        FieldSpec::optional("name", ValueShape::string()),
    ];
    if typed {
        fields.push(FieldSpec::optional("type", ValueShape::one_of(MEMBER_TYPES)));
    }
    ValueShape::Object(fields)
}

fn latest_entry() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::optional("id", ValueShape::string()).validated(checks::resource_id),
        FieldSpec::optional("source", ValueShape::file_source()),
        FieldSpec::optional("type", ValueShape::one_of(MEMBER_TYPES)),
        FieldSpec::optional("name", ValueShape::string()).validated(checks::name),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::RawDocument;

    #[test]
    fn legacy_member_lists_until_0_2_1() {
        let doc = RawDocument::from_yaml_str(
            "format_version: 0.2.1\ntype: collection\nname: c\ndescription: d\nmodel:\n  - {id: m1, rdf_source: m1.yaml}\n",
        )
        .unwrap();
        assert!(schema(VersionTag::new(0, 2, 1)).check(&doc).is_ok());
        assert!(schema(VersionTag::new(0, 2, 2)).declares("collection"));
        assert!(!schema(VersionTag::new(0, 2, 2)).declares("model"));
    }

    #[test]
    fn latest_entries_use_source() {
        let doc = RawDocument::from_yaml_str(
            "format_version: 0.3.0\ntype: collection\nname: c\ndescription: d\ncollection:\n  - {id: m1, source: https://example.com/m1.yaml, type: model}\n",
        )
        .unwrap();
        assert!(schema(VersionTag::new(0, 3, 0)).check(&doc).is_ok());
    }
}
