//! Generic resource schemas (also used for dataset, application, notebook).
//!
//! - 0.2.0: authors may be plain strings; `attachments` may be a bare list.
//! - 0.2.1: authors are objects.
//! - 0.2.2: `attachments` is a mapping with a `files` list.
//! - 0.2.3: no structural change.
//! - 0.3.0: attachments are file descriptions; `download_url` and
//!   `rdf_source` are gone; validators attached.

use rdf_core::{ResourceTypeId, VersionTag};

use super::{author, badge, cite_entry, empty_list, file_descr, maintainer};
use crate::checks;
use crate::schema::{FieldSpec, SchemaDescr, ValueShape};

/// Schema of a generic-family type at `version`.
pub fn schema(resource_type: ResourceTypeId, version: VersionTag) -> SchemaDescr {
    SchemaDescr::new(resource_type, version, fields(version))
}

/// Fields of the generic format at `version`.
pub fn fields(version: VersionTag) -> Vec<FieldSpec> {
    if version < VersionTag::new(0, 3, 0) {
        legacy_fields(LegacyStyle::of_generic(version))
    } else {
        latest_fields()
    }
}

/// Shape variations among the 0.2 generic formats and the model formats
/// built on top of them.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LegacyStyle {
    /// Authors may be plain strings.
    pub author_strings: bool,
    /// `attachments` may be a bare list.
    pub bare_attachments: bool,
}

impl LegacyStyle {
    fn of_generic(version: VersionTag) -> Self {
        Self {
            author_strings: version < VersionTag::new(0, 2, 1),
            bare_attachments: version < VersionTag::new(0, 2, 2),
        }
    }
}

fn legacy_author() -> ValueShape {
    ValueShape::Object(vec![
        FieldSpec::required("name", ValueShape::string()),
        FieldSpec::optional("affiliation", ValueShape::string()),
        FieldSpec::optional("email", ValueShape::string()),
        FieldSpec::optional("github_user", ValueShape::string()),
        FieldSpec::optional("orcid", ValueShape::string()),
    ])
}

pub(crate) fn legacy_fields(style: LegacyStyle) -> Vec<FieldSpec> {
    let authors = if style.author_strings {
        ValueShape::list(ValueShape::union(vec![
            ("author name", ValueShape::string()),
            ("author", legacy_author()),
        ]))
    } else {
        ValueShape::list(legacy_author())
    };

    let files_mapping = ValueShape::Object(vec![FieldSpec::optional(
        "files",
        ValueShape::list(ValueShape::string()),
    )]);
    let attachments = if style.bare_attachments {
        ValueShape::union(vec![
            ("file list", ValueShape::list(ValueShape::string())),
            ("attachments mapping", files_mapping),
        ])
    } else {
        files_mapping
    };

    let legacy_cite = ValueShape::Object(vec![
        FieldSpec::required("text", ValueShape::string()),
        FieldSpec::optional("doi", ValueShape::string()),
        FieldSpec::optional("url", ValueShape::string()),
    ]);

    vec![
        FieldSpec::required("format_version", ValueShape::Version),
        FieldSpec::required("type", ValueShape::string()),
        FieldSpec::required("name", ValueShape::string()),
        FieldSpec::required("description", ValueShape::string()),
        FieldSpec::optional("id", ValueShape::string()),
        FieldSpec::optional("authors", authors),
        FieldSpec::optional("maintainers", ValueShape::list(ValueShape::Opaque)),
        FieldSpec::optional("cite", ValueShape::list(legacy_cite)),
        FieldSpec::optional("license", ValueShape::string()),
        FieldSpec::optional("version", ValueShape::string()),
        FieldSpec::optional("tags", ValueShape::list(ValueShape::string())),
        FieldSpec::optional("documentation", ValueShape::string()),
        FieldSpec::optional("covers", ValueShape::list(ValueShape::string())),
        FieldSpec::optional("attachments", attachments),
        FieldSpec::optional("badges", ValueShape::list(ValueShape::Opaque)),
        FieldSpec::optional("links", ValueShape::list(ValueShape::string())),
        FieldSpec::optional("git_repo", ValueShape::string()),
        FieldSpec::optional("icon", ValueShape::string()),
        FieldSpec::optional("source", ValueShape::string()),
        FieldSpec::optional("download_url", ValueShape::string()),
        FieldSpec::optional("rdf_source", ValueShape::string()),
        FieldSpec::optional("config", ValueShape::Opaque),
    ]
}

/// Fields of the generic 0.3.0 format, with validators.
pub(crate) fn latest_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("format_version", ValueShape::Version),
        FieldSpec::required("type", ValueShape::string()),
        FieldSpec::required("name", ValueShape::string()).validated(checks::name),
        FieldSpec::required("description", ValueShape::string()).validated(checks::description),
        FieldSpec::optional("id", ValueShape::string()).validated(checks::resource_id),
        FieldSpec::optional("authors", ValueShape::list(author())).with_default(empty_list()),
        FieldSpec::optional("maintainers", ValueShape::list(maintainer()))
            .with_default(empty_list()),
        FieldSpec::optional("cite", ValueShape::list(cite_entry()))
            .with_default(empty_list())
            .validated(checks::cite),
        FieldSpec::optional("license", ValueShape::string()).validated(checks::license),
        FieldSpec::optional("version", ValueShape::string()).validated(checks::resource_version),
        FieldSpec::optional("tags", ValueShape::list(ValueShape::string()))
            .with_default(empty_list())
            .validated(checks::tags),
        FieldSpec::optional("documentation", ValueShape::file_source())
            .validated(checks::documentation),
        FieldSpec::optional("covers", ValueShape::list(ValueShape::file_source()))
            .with_default(empty_list())
            .validated(checks::covers),
        FieldSpec::optional("attachments", ValueShape::list(file_descr()))
            .with_default(empty_list()),
        FieldSpec::optional("badges", ValueShape::list(badge())).with_default(empty_list()),
        FieldSpec::optional("links", ValueShape::list(ValueShape::string()))
            .with_default(empty_list()),
        FieldSpec::optional("git_repo", ValueShape::string()).validated(checks::git_repo),
        FieldSpec::optional("icon", ValueShape::string()),
        FieldSpec::optional("source", ValueShape::file_source()),
        FieldSpec::optional("config", ValueShape::Opaque),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::RawDocument;

    fn check(version: VersionTag, yaml: &str) -> bool {
        let doc = RawDocument::from_yaml_str(yaml).unwrap();
        schema(ResourceTypeId::Generic, version).check(&doc).is_ok()
    }

    #[test]
    fn author_strings_only_in_0_2_0() {
        let yaml = "format_version: 0.2.0\ntype: rdf\nname: n\ndescription: d\nauthors: [Jane Doe]\n";
        assert!(check(VersionTag::new(0, 2, 0), yaml));
        assert!(!check(VersionTag::new(0, 2, 1), yaml));
    }

    #[test]
    fn bare_attachments_until_0_2_1() {
        let yaml = "format_version: 0.2.1\ntype: rdf\nname: n\ndescription: d\nattachments: [a.txt]\n";
        assert!(check(VersionTag::new(0, 2, 1), yaml));
        assert!(!check(VersionTag::new(0, 2, 2), yaml));
        let wrapped = "format_version: 0.2.2\ntype: rdf\nname: n\ndescription: d\nattachments: {files: [a.txt]}\n";
        assert!(check(VersionTag::new(0, 2, 2), wrapped));
    }

    #[test]
    fn latest_attachments_are_file_descriptions() {
        let yaml = "format_version: 0.3.0\ntype: generic\nname: n\ndescription: d\nattachments:\n  - source: a.txt\n";
        assert!(check(VersionTag::new(0, 3, 0), yaml));
        let legacy = "format_version: 0.3.0\ntype: generic\nname: n\ndescription: d\nattachments: {files: [a.txt]}\n";
        assert!(!check(VersionTag::new(0, 3, 0), legacy));
    }
}
