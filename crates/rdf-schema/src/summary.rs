//! # Validation Summary
//!
//! Accumulated, severity-leveled findings for one document.
//!
//! ## Design
//!
//! Checks never short-circuit. Every check appends to a [`SummaryBuilder`];
//! when all checks have run, [`SummaryBuilder::finish`] freezes the entries
//! into a [`ValidationSummary`] that has no mutation API. Entries keep the
//! order in which they were recorded, which follows schema declaration
//! order for field checks, then cross-field checks.

use std::fmt;

use rdf_core::{FieldPath, Severity};
use serde::Serialize;

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationEntry {
    /// How serious the finding is.
    pub severity: Severity,
    /// Where in the document it applies.
    pub loc: FieldPath,
    /// Human-readable description.
    pub msg: String,
}

impl fmt::Display for ValidationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<7} {}: {}", self.severity, self.loc, self.msg)
    }
}

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No entries above `info`.
    Passed,
    /// At least one warning, no errors.
    ValidWithWarnings,
    /// At least one error.
    Failed,
}

impl Status {
    fn from_max(severity: Option<Severity>) -> Self {
        match severity {
            Some(Severity::Error) => Self::Failed,
            Some(Severity::Warning) => Self::ValidWithWarnings,
            Some(Severity::Info) | None => Self::Passed,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::ValidWithWarnings => "valid with warnings",
            Self::Failed => "failed",
        })
    }
}

/// Collects entries while checks run.
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    entries: Vec<ValidationEntry>,
}

impl SummaryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry.
    pub fn push(&mut self, severity: Severity, loc: FieldPath, msg: impl Into<String>) {
        self.entries.push(ValidationEntry {
            severity,
            loc,
            msg: msg.into(),
        });
    }

    /// Record an error.
    pub fn error(&mut self, loc: FieldPath, msg: impl Into<String>) {
        self.push(Severity::Error, loc, msg);
    }

    /// Record a warning.
    pub fn warning(&mut self, loc: FieldPath, msg: impl Into<String>) {
        self.push(Severity::Warning, loc, msg);
    }

    /// Record an informational entry.
    pub fn info(&mut self, loc: FieldPath, msg: impl Into<String>) {
        self.push(Severity::Info, loc, msg);
    }

    /// Append all entries of another summary.
    pub fn merge(&mut self, other: ValidationSummary) {
        self.entries.extend(other.entries);
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the entries.
    pub fn finish(self) -> ValidationSummary {
        ValidationSummary {
            entries: self.entries,
        }
    }
}

/// Frozen validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    entries: Vec<ValidationEntry>,
}

impl ValidationSummary {
    /// All entries in recording order.
    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|e| e.severity).max()
    }

    /// Status derived from the highest severity.
    pub fn status(&self) -> Status {
        Status::from_max(self.max_severity())
    }

    /// Entries of exactly the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(move |e| e.severity == severity)
    }

    /// Number of `error` entries.
    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    /// Number of `warning` entries.
    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    /// Whether the described resource is usable (no `error` entries).
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ValidationSummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ValidationSummary", 4)?;
        s.serialize_field("status", &self.status())?;
        s.serialize_field("errors", &self.error_count())?;
        s.serialize_field("warnings", &self.warning_count())?;
        s.serialize_field("entries", &self.entries)?;
        s.end()
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        write!(
            f,
            "{} ({} errors, {} warnings)",
            self.status(),
            self.error_count(),
            self.warning_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_passes() {
        let summary = SummaryBuilder::new().finish();
        assert_eq!(summary.status(), Status::Passed);
        assert!(summary.is_valid());
    }

    #[test]
    fn status_is_max_severity() {
        let mut builder = SummaryBuilder::new();
        builder.info(FieldPath::root(), "note");
        builder.warning(FieldPath::field("a"), "hmm");
        assert_eq!(builder.len(), 2);
        let summary = builder.finish();
        assert_eq!(summary.status(), Status::ValidWithWarnings);

        let mut builder = SummaryBuilder::new();
        builder.error(FieldPath::field("a"), "bad");
        builder.info(FieldPath::field("b"), "fine");
        assert_eq!(builder.finish().status(), Status::Failed);
    }

    #[test]
    fn entries_keep_recording_order() {
        let mut builder = SummaryBuilder::new();
        builder.error(FieldPath::field("z"), "first");
        builder.warning(FieldPath::field("a"), "second");
        let summary = builder.finish();
        let msgs: Vec<&str> = summary.entries().iter().map(|e| e.msg.as_str()).collect();
        assert_eq!(msgs, vec!["first", "second"]);
    }

    #[test]
    fn merge_appends() {
        let mut other = SummaryBuilder::new();
        other.error(FieldPath::field("x"), "bad");
        let mut builder = SummaryBuilder::new();
        builder.warning(FieldPath::field("y"), "meh");
        builder.merge(other.finish());
        let summary = builder.finish();
        assert_eq!(summary.error_count(), 1);
        assert_eq!(summary.warning_count(), 1);
    }

    #[test]
    fn serializes_with_status() {
        let mut builder = SummaryBuilder::new();
        builder.error(FieldPath::field("name").index(0), "bad");
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["errors"], 1);
        assert_eq!(json["entries"][0]["loc"], "name[0]");
        assert_eq!(json["entries"][0]["severity"], "error");
    }
}
