//! # Field Validators
//!
//! Semantic checks attached to fields of the latest schemas. Each check has
//! the [`FieldValidator`](crate::schema::FieldValidator) signature: it reads
//! a value that already passed structural conformance and appends entries
//! to the summary. A check never fails early; a value that is not of the
//! expected kind is skipped, since structure has been checked before.
//!
//! ## License Identifiers
//!
//! [`spdx_replacement`] maps deprecated license identifiers to their SPDX
//! successors. The migration chain uses the same table to rewrite
//! deprecated identifiers, so a migrated document never warns about one.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rdf_core::files::is_valid_url;
use rdf_core::FieldPath;
use serde_yaml::Value;

use crate::summary::SummaryBuilder;
use crate::typed::FileSource;
use crate::validate::ValidationContext;

/// Longest name accepted without a warning.
pub const MAX_NAME_LENGTH: usize = 128;

/// Pre- and postprocessing operations.
pub const PROCESSING_IDS: &[&str] = &[
    "binarize",
    "clip",
    "ensure_dtype",
    "fixed_zero_mean_unit_variance",
    "scale_linear",
    "scale_mean_variance",
    "scale_range",
    "sigmoid",
    "zero_mean_unit_variance",
];

const COVER_EXTENSIONS: &[&str] = &["gif", "jpeg", "jpg", "png", "svg"];

const KNOWN_LICENSES: &[&str] = &[
    "0BSD",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-2.0",
    "Artistic-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSD-3-Clause-Clear",
    "BSL-1.0",
    "CC-BY-4.0",
    "CC-BY-NC-4.0",
    "CC-BY-NC-SA-4.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "CECILL-2.1",
    "EPL-2.0",
    "EUPL-1.2",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "MIT",
    "MIT-0",
    "MPL-2.0",
    "NCSA",
    "Unlicense",
    "Zlib",
];

const DEPRECATED_LICENSES: &[(&str, &str)] = &[
    ("AGPL-3.0", "AGPL-3.0-only"),
    ("BSD-2-Clause-FreeBSD", "BSD-2-Clause"),
    ("BSD-2-Clause-NetBSD", "BSD-2-Clause"),
    ("GPL-2.0", "GPL-2.0-only"),
    ("GPL-2.0+", "GPL-2.0-or-later"),
    ("GPL-3.0", "GPL-3.0-only"),
    ("GPL-3.0+", "GPL-3.0-or-later"),
    ("LGPL-2.1", "LGPL-2.1-only"),
    ("LGPL-2.1+", "LGPL-2.1-or-later"),
    ("LGPL-3.0", "LGPL-3.0-only"),
    ("LGPL-3.0+", "LGPL-3.0-or-later"),
];

/// SPDX successor of a deprecated license identifier.
pub fn spdx_replacement(license: &str) -> Option<&'static str> {
    DEPRECATED_LICENSES
        .iter()
        .find(|(old, _)| *old == license)
        .map(|(_, new)| *new)
}

/// Whether `license` is a current SPDX identifier this crate knows.
pub fn is_known_license(license: &str) -> bool {
    KNOWN_LICENSES.contains(&license)
}

/// Strip a `https://doi.org/` (or `http://dx.doi.org/`) prefix.
pub fn bare_doi(doi: &str) -> &str {
    for prefix in [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
    ] {
        if let Some(rest) = doi.strip_prefix(prefix) {
            return rest;
        }
    }
    doi
}

fn identifier_chars(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ─── Generic fields ─────────────────────────────────────────────────

/// Display name: non-empty, no path separators, reasonably short.
pub fn name(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if s.trim().is_empty() {
        out.error(path.clone(), "name must not be empty");
    } else if s.contains('/') || s.contains('\\') {
        out.error(path.clone(), format!("name {s:?} must not contain '/' or '\\'"));
    } else if s.chars().count() > MAX_NAME_LENGTH {
        out.warning(
            path.clone(),
            format!("name is longer than {MAX_NAME_LENGTH} characters"),
        );
    }
}

/// Free-text description, bounded by the configured length.
pub fn description(
    value: &Value,
    path: &FieldPath,
    ctx: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    let max = ctx.config.max_description_length;
    if s.trim().is_empty() {
        out.error(path.clone(), "description must not be empty");
    } else if s.chars().count() > max {
        out.warning(
            path.clone(),
            format!("description is longer than {max} characters"),
        );
    }
}

/// Resource identifiers: lowercase letters, digits, `_ - . /`.
pub fn resource_id(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    if s.is_empty() {
        out.error(path.clone(), "id must not be empty");
        return;
    }
    let valid = s.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '/')
    });
    if !valid {
        out.error(
            path.clone(),
            format!("id {s:?} may only contain lowercase letters, digits and '_-./'"),
        );
    }
}

/// SPDX license identifier.
pub fn license(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if let Some(replacement) = spdx_replacement(s) {
        out.warning(
            path.clone(),
            format!("license {s:?} is deprecated; use {replacement:?}"),
        );
    } else if !is_known_license(s) {
        out.warning(path.clone(), format!("{s:?} is not a known SPDX license identifier"));
    }
}

/// Resource version: `MAJOR.MINOR.PATCH` with optional pre-release and
/// build suffixes.
pub fn resource_version(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    if !is_semver(s) {
        out.error(path.clone(), format!("{s:?} is not a semantic version"));
    }
}

fn is_semver(s: &str) -> bool {
    let (core, _build) = s.split_once('+').unwrap_or((s, ""));
    let (core, pre) = match core.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (core, None),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let numeric = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    numeric && pre.map_or(true, |p| !p.is_empty())
}

/// Tags: no empty or duplicate entries.
pub fn tags(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(items) = value.as_sequence() else { return };
    let mut seen = BTreeSet::new();
    for (i, tag) in items.iter().enumerate() {
        let Some(tag) = tag.as_str() else { continue };
        if tag.trim().is_empty() {
            out.error(path.index(i), "tag must not be empty");
        } else if !seen.insert(tag) {
            out.warning(path.index(i), format!("duplicate tag {tag:?}"));
        }
    }
}

fn extension(source: &str) -> Option<String> {
    FileSource::try_from(source.to_string())
        .ok()
        .and_then(|source| source.extension())
}

/// Documentation must be Markdown.
pub fn documentation(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    if extension(s).as_deref() != Some("md") {
        out.error(path.clone(), format!("documentation {s:?} must be a Markdown (.md) file"));
    }
}

/// Cover images must use a common image format.
pub fn covers(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(items) = value.as_sequence() else { return };
    for (i, cover) in items.iter().enumerate() {
        let Some(cover) = cover.as_str() else { continue };
        let ok = extension(cover).is_some_and(|ext| COVER_EXTENSIONS.contains(&ext.as_str()));
        if !ok {
            out.error(
                path.index(i),
                format!(
                    "cover {cover:?} must be one of: {}",
                    COVER_EXTENSIONS.join(", ")
                ),
            );
        }
    }
}

/// Repository URL.
pub fn git_repo(value: &Value, path: &FieldPath, ctx: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    url(value, path, ctx, out);
}

/// Every citation needs a DOI or a URL.
pub fn cite(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(items) = value.as_sequence() else { return };
    for (i, entry) in items.iter().enumerate() {
        let has = |key: &str| entry.get(key).is_some_and(|v| !v.is_null());
        if !has("doi") && !has("url") {
            out.error(path.index(i), "citation needs a doi or a url");
        }
    }
}

// ─── People ─────────────────────────────────────────────────────────

/// Person name.
pub fn person_name(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    if s.trim().is_empty() {
        out.error(path.clone(), "name must not be empty");
    }
}

/// Email address: one `@` with a non-empty local part and a dotted domain.
pub fn email(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    let valid = match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        out.error(path.clone(), format!("{s:?} is not an email address"));
    }
}

/// GitHub user name: up to 39 letters, digits or single hyphens.
pub fn github_user(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    let valid = !s.is_empty()
        && s.len() <= 39
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--");
    if !valid {
        out.error(path.clone(), format!("{s:?} is not a valid GitHub user name"));
    }
}

/// ORCID iD with ISO 7064 11,2 check digit.
pub fn orcid(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if !is_orcid(s) {
        out.error(path.clone(), format!("{s:?} is not a valid ORCID iD"));
    }
}

fn is_orcid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    if groups.len() != 4 || groups.iter().any(|g| g.len() != 4) {
        return false;
    }
    let chars: Vec<char> = groups.concat().chars().collect();
    let (body, check) = chars.split_at(15);
    let mut total: u32 = 0;
    for c in body {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        total = (total + d) * 2;
    }
    let expected = (12 - total % 11) % 11;
    match check[0] {
        'X' => expected == 10,
        c => c.to_digit(10) == Some(expected),
    }
}

// ─── Links ──────────────────────────────────────────────────────────

/// A bare DOI (`10.<registrant>/<suffix>`).
pub fn doi(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    let bare = bare_doi(s);
    if bare != s {
        out.warning(path.clone(), format!("use the bare DOI {bare:?} instead of a URL"));
    }
    let valid = bare
        .strip_prefix("10.")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(registrant, suffix)| !registrant.is_empty() && !suffix.is_empty());
    if !valid {
        out.error(path.clone(), format!("{s:?} is not a DOI"));
    }
}

/// An `http`, `https` or `ftp` URL with a host.
pub fn url(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if !is_valid_url(s) {
        out.error(path.clone(), format!("{s:?} is not a URL"));
    }
}

/// ISO 8601 date-time, or a plain date.
pub fn timestamp(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if !is_timestamp(s) {
        out.error(path.clone(), format!("{s:?} is not an ISO 8601 timestamp"));
    }
}

fn is_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

// ─── Tensors ────────────────────────────────────────────────────────

/// Tensor id: letters, digits, `_` and `-`, at most 32 characters.
pub fn tensor_id(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if s.is_empty() || s.len() > 32 || !identifier_chars(s) {
        out.error(
            path.clone(),
            format!("tensor id {s:?} must be 1-32 letters, digits, '_' or '-'"),
        );
    }
}

/// Axis id: letters, digits, `_` and `-`, at most 16 characters.
pub fn axis_id(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(s) = value.as_str() else { return };
    if s.is_empty() || s.len() > 16 || !identifier_chars(s) {
        out.error(
            path.clone(),
            format!("axis id {s:?} must be 1-16 letters, digits, '_' or '-'"),
        );
    }
}

/// Axis ids are unique within a tensor and there is at most one batch axis.
pub fn axes(value: &Value, path: &FieldPath, _: &ValidationContext<'_>, out: &mut SummaryBuilder) {
    let Some(items) = value.as_sequence() else { return };
    let mut seen = BTreeSet::new();
    let mut batch_axes = 0;
    for (i, axis) in items.iter().enumerate() {
        let kind = axis.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind == "batch" {
            batch_axes += 1;
            if batch_axes == 2 {
                out.error(path.index(i), "a tensor has at most one batch axis");
            }
        }
        let id = axis
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(match kind {
                "space" => "",
                other => other,
            });
        if !id.is_empty() && !seen.insert(id) {
            out.error(path.index(i).key("id"), format!("duplicate axis id {id:?}"));
        }
    }
}

/// Physical axis scale.
pub fn positive_scale(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    if let Some(scale) = value.as_f64() {
        if scale.is_nan() || scale <= 0.0 {
            out.error(path.clone(), format!("scale must be positive, found {scale}"));
        }
    }
}

/// Channel names: at least one, no duplicates.
pub fn channel_names(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(items) = value.as_sequence() else { return };
    if items.is_empty() {
        out.error(path.clone(), "a channel axis needs at least one channel name");
    }
    let mut seen = BTreeSet::new();
    for (i, name) in items.iter().enumerate() {
        if let Some(name) = name.as_str() {
            if !seen.insert(name) {
                out.error(path.index(i), format!("duplicate channel name {name:?}"));
            }
        }
    }
}

/// Value range `[min, max]`; `null` bounds are open.
pub fn data_range(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(items) = value.as_sequence() else { return };
    if items.len() != 2 {
        out.error(
            path.clone(),
            format!("range needs exactly two bounds, found {}", items.len()),
        );
        return;
    }
    if let (Some(min), Some(max)) = (items[0].as_f64(), items[1].as_f64()) {
        if min > max {
            out.error(path.clone(), format!("range minimum {min} exceeds maximum {max}"));
        }
    }
}

/// Known processing operation.
pub fn processing_id(
    value: &Value,
    path: &FieldPath,
    _: &ValidationContext<'_>,
    out: &mut SummaryBuilder,
) {
    let Some(s) = value.as_str() else { return };
    if !PROCESSING_IDS.contains(&s) {
        out.error(
            path.clone(),
            format!("unknown processing {s:?}; expected one of: {}", PROCESSING_IDS.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::ValidationSummary;
    use rdf_core::{EngineConfig, Severity};

    fn run(check: crate::schema::FieldValidator, value: Value) -> ValidationSummary {
        let config = EngineConfig::default();
        let ctx = ValidationContext::new(&config);
        let mut out = SummaryBuilder::new();
        check(&value, &FieldPath::field("f"), &ctx, &mut out);
        out.finish()
    }

    fn severities(check: crate::schema::FieldValidator, value: &str) -> Vec<Severity> {
        run(check, Value::from(value))
            .entries()
            .iter()
            .map(|e| e.severity)
            .collect()
    }

    #[test]
    fn orcid_checksum() {
        assert!(is_orcid("0000-0002-1825-0097"));
        assert!(is_orcid("0000-0002-1694-233X"));
        assert!(!is_orcid("0000-0002-1825-0098"));
        assert!(!is_orcid("0000-0002-1825"));
    }

    #[test]
    fn license_levels() {
        assert!(severities(license, "MIT").is_empty());
        assert_eq!(severities(license, "GPL-3.0"), vec![Severity::Warning]);
        assert_eq!(severities(license, "my-own"), vec![Severity::Warning]);
        assert_eq!(spdx_replacement("LGPL-2.1+"), Some("LGPL-2.1-or-later"));
    }

    #[test]
    fn doi_urls_warn_and_bare_dois_pass() {
        assert!(severities(doi, "10.1038/s41592-019-0582-9").is_empty());
        assert_eq!(
            severities(doi, "https://doi.org/10.1038/s41592-019-0582-9"),
            vec![Severity::Warning]
        );
        assert_eq!(severities(doi, "not-a-doi"), vec![Severity::Error]);
    }

    #[test]
    fn urls_need_a_host() {
        assert!(severities(url, "https://github.com/org/repo").is_empty());
        for bad in ["https://", "https://exa mple.org", "github.com/org/repo"] {
            assert_eq!(severities(url, bad), vec![Severity::Error], "{bad:?}");
        }
        assert_eq!(severities(git_repo, "https://"), vec![Severity::Error]);
    }

    #[test]
    fn description_length_follows_config() {
        let config = EngineConfig {
            max_description_length: 5,
            ..EngineConfig::default()
        };
        let ctx = ValidationContext::new(&config);
        let mut out = SummaryBuilder::new();
        description(&Value::from("too long"), &FieldPath::field("description"), &ctx, &mut out);
        let summary = out.finish();
        assert_eq!(summary.warning_count(), 1);
    }

    #[test]
    fn semantic_versions() {
        assert!(is_semver("1.2.3"));
        assert!(is_semver("0.1.0-beta.2+build5"));
        assert!(!is_semver("1.2"));
        assert!(!is_semver("v1.2.3"));
        assert!(!is_semver("1.2.3-"));
    }

    #[test]
    fn timestamps() {
        assert!(is_timestamp("2019-12-11T12:22:32Z"));
        assert!(is_timestamp("2019-12-11T12:22:32.123"));
        assert!(is_timestamp("2019-12-11"));
        assert!(!is_timestamp("yesterday"));
    }

    #[test]
    fn documentation_and_covers_extensions() {
        assert!(severities(documentation, "docs/README.MD").is_empty());
        assert_eq!(severities(documentation, "README.txt"), vec![Severity::Error]);
        let covers_value: Value = serde_yaml::from_str("[cover.png, cover.tif]").unwrap();
        let summary = run(covers, covers_value);
        assert_eq!(summary.error_count(), 1);
        assert_eq!(summary.entries()[0].loc.to_string(), "f[1]");
    }

    #[test]
    fn duplicate_axis_ids_and_batch_axes() {
        let value: Value = serde_yaml::from_str(
            "- {type: batch}\n- {type: batch, id: b2}\n- {type: space, id: x}\n- {type: space, id: x}\n",
        )
        .unwrap();
        let summary = run(axes, value);
        let locs: Vec<String> = summary.entries().iter().map(|e| e.loc.to_string()).collect();
        assert_eq!(locs, vec!["f[1]", "f[3].id"]);
    }

    #[test]
    fn range_bounds() {
        let ok: Value = serde_yaml::from_str("[0, .inf]").unwrap();
        assert!(run(data_range, ok).is_empty());
        let open: Value = serde_yaml::from_str("[null, 1]").unwrap();
        assert!(run(data_range, open).is_empty());
        let inverted: Value = serde_yaml::from_str("[2, 1]").unwrap();
        assert_eq!(run(data_range, inverted).error_count(), 1);
        let short: Value = serde_yaml::from_str("[0]").unwrap();
        assert_eq!(run(data_range, short).error_count(), 1);
    }

    #[test]
    fn citation_needs_a_link() {
        let value: Value =
            serde_yaml::from_str("- {text: a, doi: 10.1/x}\n- {text: b}\n").unwrap();
        let summary = run(cite, value);
        assert_eq!(summary.error_count(), 1);
        assert_eq!(summary.entries()[0].loc.to_string(), "f[1]");
    }

    #[test]
    fn people() {
        assert!(severities(email, "jane@example.org").is_empty());
        assert_eq!(severities(email, "jane@localhost"), vec![Severity::Error]);
        assert!(severities(github_user, "jane-doe").is_empty());
        assert_eq!(severities(github_user, "-jane"), vec![Severity::Error]);
    }
}
