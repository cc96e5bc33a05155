//! File sources and file descriptions shared by all resource types.

use std::fmt;

use rdf_core::files::is_valid_url;
use rdf_core::Sha256Digest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string that is neither a URL nor a relative path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a URL or relative path: {0:?}")]
pub struct InvalidFileSource(pub String);

/// Where a file lives: `Url | RelativePath`, tried in that order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FileSource {
    /// Remote file.
    Url(String),
    /// Path relative to the document.
    RelativePath(String),
}

impl FileSource {
    /// The location as written.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::RelativePath(s) => s,
        }
    }

    /// File name extension, lowercased, without query or fragment.
    pub fn extension(&self) -> Option<String> {
        let path = self.as_str().split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or(path);
        file.rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

impl TryFrom<String> for FileSource {
    type Error = InvalidFileSource;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_url(&value) {
            Ok(Self::Url(value))
        } else if value.is_empty()
            || value.contains("://")
            || value.starts_with('/')
            || value.starts_with('\\')
        {
            Err(InvalidFileSource(value))
        } else {
            Ok(Self::RelativePath(value))
        }
    }
}

impl From<FileSource> for String {
    fn from(source: FileSource) -> Self {
        match source {
            FileSource::Url(s) | FileSource::RelativePath(s) => s,
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file with an optional pinned digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescr {
    /// Location.
    pub source: FileSource,
    /// Expected SHA-256 of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<Sha256Digest>,
}
