//! Fields shared by every resource type at the latest generic format.

use rdf_core::VersionTag;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::file::{FileDescr, FileSource};

/// A person who created the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Full name.
    pub name: String,
    /// Institution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// GitHub account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_user: Option<String>,
    /// ORCID iD (`0000-0000-0000-0000`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

/// A person who maintains the resource. The GitHub account is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    /// GitHub account.
    pub github_user: String,
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Institution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// ORCID iD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

/// A publication to cite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiteEntry {
    /// Free-text citation.
    pub text: String,
    /// Bare DOI (`10.1234/abc`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// Link when no DOI exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A badge shown next to the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Badge text.
    pub label: String,
    /// Badge image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Link target.
    pub url: String,
}

/// A reference to another published resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedResource {
    /// Resource id.
    pub id: String,
    /// Pinned version of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Generic resource description (format 0.3.0).
///
/// Dataset, application and notebook descriptions consist of exactly
/// these fields; collections and models extend them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericDescr {
    /// Declared format version.
    pub format_version: VersionTag,
    /// Declared type literal.
    #[serde(rename = "type")]
    pub type_literal: String,
    /// Human-readable name.
    pub name: String,
    /// One-paragraph description.
    pub description: String,
    /// Identifier assigned by a resource hub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creators.
    #[serde(default)]
    pub authors: Vec<Author>,
    /// Maintainers.
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    /// Citations.
    #[serde(default)]
    pub cite: Vec<CiteEntry>,
    /// SPDX license identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Version of the resource itself (not of the format).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Markdown documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<FileSource>,
    /// Cover images.
    #[serde(default)]
    pub covers: Vec<FileSource>,
    /// Additional files.
    #[serde(default)]
    pub attachments: Vec<FileDescr>,
    /// Badges.
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// Ids of related resources.
    #[serde(default)]
    pub links: Vec<String>,
    /// Source repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repo: Option<String>,
    /// Emoji or image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Source of the resource content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FileSource>,
    /// Free-form configuration; preserved, never validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}
