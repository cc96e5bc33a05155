//! # Local File Verification
//!
//! Resolves the [`FileReference`]s of a description against the directory
//! holding the document, hashes what it finds, and reports the outcomes as
//! [`FileVerifications`] for the engine to turn into validation entries.
//!
//! URLs are not fetched. They are left out of the result, so the engine
//! reports nothing for them.

use std::path::Path;

use rdf_core::{FileReference, FileVerifications, Sha256Digest, VerificationResult};

/// Verify every local reference relative to `base_dir`.
pub fn verify_local(references: Vec<FileReference>, base_dir: &Path) -> FileVerifications {
    let mut out = FileVerifications::new();
    for reference in references {
        if reference.is_url() {
            tracing::debug!(location = %reference.location, "skipping remote file");
            continue;
        }
        let result = verify_one(&reference, base_dir);
        tracing::debug!(file = %reference, ?result, "checked file");
        out.insert(reference, result);
    }
    out
}

fn verify_one(reference: &FileReference, base_dir: &Path) -> VerificationResult {
    let path = base_dir.join(&reference.location);
    if !path.is_file() {
        return VerificationResult::Missing;
    }
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return VerificationResult::Unreachable {
                reason: e.to_string(),
            }
        }
    };
    match reference.sha256 {
        Some(expected) => {
            let actual = Sha256Digest::of_bytes(&bytes);
            if actual == expected {
                VerificationResult::Verified
            } else {
                VerificationResult::HashMismatch { expected, actual }
            }
        }
        None => VerificationResult::Verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::FieldPath;

    fn reference(location: &str, sha256: Option<Sha256Digest>) -> FileReference {
        FileReference {
            location: location.to_string(),
            sha256,
            field: FieldPath::field("documentation"),
        }
    }

    #[test]
    fn outcomes_per_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), b"# Model").unwrap();
        std::fs::write(dir.path().join("weights.pt"), b"weights").unwrap();

        let good = Sha256Digest::of_bytes(b"# Model");
        let bad = Sha256Digest::of_bytes(b"other");
        let files = verify_local(
            vec![
                reference("README.md", Some(good)),
                reference("weights.pt", Some(bad)),
                reference("gone.npy", None),
                reference("https://zenodo.org/w.pt", None),
            ],
            dir.path(),
        );

        assert_eq!(files.len(), 3);
        assert_eq!(
            files[&reference("README.md", Some(good))],
            VerificationResult::Verified
        );
        assert!(matches!(
            files[&reference("weights.pt", Some(bad))],
            VerificationResult::HashMismatch { .. }
        ));
        assert_eq!(
            files[&reference("gone.npy", None)],
            VerificationResult::Missing
        );
    }

    #[test]
    fn undeclared_digest_only_needs_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/README.md"), b"").unwrap();
        let files = verify_local(vec![reference("docs/README.md", None)], dir.path());
        assert!(files.values().all(|r| *r == VerificationResult::Verified));
    }
}
