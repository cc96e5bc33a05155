//! # File References
//!
//! The narrow interface between the synchronous core and external file
//! resolution. The core lists the files a description needs as
//! [`FileReference`]s; a caller resolves, downloads, or hashes them however
//! it likes and hands the outcomes back as [`FileVerifications`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::digest::Sha256Digest;
use crate::path::FieldPath;

/// A file a description depends on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileReference {
    /// URL or path relative to the document.
    pub location: String,
    /// Declared digest, when the document pins one.
    pub sha256: Option<Sha256Digest>,
    /// Where in the document the reference was declared.
    pub field: FieldPath,
}

impl FileReference {
    /// Whether the location is a URL rather than a relative path.
    pub fn is_url(&self) -> bool {
        is_valid_url(&self.location)
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.location, self.field)
    }
}

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Parse an `http`, `https` or `ftp` URL that names a host.
///
/// The scheme must be followed by `://` and the string must not contain
/// whitespace; the parser would otherwise accept `http:host` and
/// percent-encode embedded spaces.
pub fn parse_url(location: &str) -> Option<Url> {
    if location.contains(char::is_whitespace) {
        return None;
    }
    let (scheme, _) = location.split_once("://")?;
    if !URL_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }
    let url = Url::parse(location).ok()?;
    url.host_str().filter(|host| !host.is_empty())?;
    Some(url)
}

/// Whether a string is an `http`, `https` or `ftp` URL with a host.
pub fn is_valid_url(location: &str) -> bool {
    parse_url(location).is_some()
}

/// Outcome of an external check of one [`FileReference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    /// The file exists and matches its declared digest (if any).
    Verified,
    /// The file does not exist.
    Missing,
    /// The file's digest differs from the declared one.
    HashMismatch {
        /// Declared digest.
        expected: Sha256Digest,
        /// Computed digest.
        actual: Sha256Digest,
    },
    /// The file could not be checked (network failure, permissions).
    Unreachable {
        /// Why the check could not complete.
        reason: String,
    },
}

/// Caller-supplied verification outcomes, keyed by reference.
pub type FileVerifications = BTreeMap<FileReference, VerificationResult>;
