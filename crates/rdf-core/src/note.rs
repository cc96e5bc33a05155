//! # Migration Notes
//!
//! Lossy or noteworthy changes made while upgrading a document, such as a
//! field that was dropped because the newer format has no place for it.
//! Notes are produced by the migration engine and surface later as
//! validation entries.

use std::fmt;

use serde::Serialize;

use crate::path::FieldPath;
use crate::version::VersionTag;

/// One noteworthy change applied by a migration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationNote {
    /// Source version of the step that emitted the note.
    pub from: VersionTag,
    /// Target version of the step that emitted the note.
    pub to: VersionTag,
    /// Affected field.
    pub field: FieldPath,
    /// What happened.
    pub message: String,
}

impl fmt::Display for MigrationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}: {}", self.from, self.to, self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_step_and_field() {
        let note = MigrationNote {
            from: VersionTag::new(0, 2, 3),
            to: VersionTag::new(0, 3, 0),
            field: FieldPath::field("download_url"),
            message: "dropped".to_string(),
        };
        assert_eq!(note.to_string(), "0.2.3 -> 0.3.0: download_url: dropped");
    }
}
