//! # Schema Descriptions
//!
//! A [`SchemaDescr`] is the field set of one (resource type, format
//! version): an ordered list of [`FieldSpec`]s, each with a name, a
//! required marker, a [`ValueShape`], an optional default, and an optional
//! field validator.
//!
//! ## Structure vs. Semantics
//!
//! Shapes are *structural*: they decide whether a value can be read as the
//! declared kind at all (a string, a list of objects, one arm of a union).
//! Structural conformance is checked by [`SchemaDescr::conform`], which
//! reports every violation at once and produces a normalized value with
//! defaults filled in and null optionals removed.
//!
//! Field validators are *semantic*: they run later, against a document that
//! is already known to conform, and append validation entries instead of
//! failing.
//!
//! ## Open Objects
//!
//! Objects accept keys they do not declare. Unknown top-level fields are a
//! validation concern, not a structural one.

use std::fmt;

use rdf_core::document::{kind_name, untagged};
use rdf_core::files::is_valid_url;
use rdf_core::{FieldPath, RawDocument, ResourceTypeId, Sha256Digest, VersionTag};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::summary::SummaryBuilder;
use crate::validate::ValidationContext;

/// A semantic check attached to a field. Called with the field's value and
/// location; appends entries instead of returning errors.
pub type FieldValidator = fn(&Value, &FieldPath, &ValidationContext<'_>, &mut SummaryBuilder);

// ─── Shapes ─────────────────────────────────────────────────────────

/// Constraint on the content of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrFormat {
    /// Any string.
    Any,
    /// An `http`, `https` or `ftp` URL with a host.
    Url,
    /// A non-empty relative path without a scheme.
    RelativePath,
    /// 64 hexadecimal characters.
    Sha256,
    /// One of a fixed set of literals.
    OneOf(&'static [&'static str]),
}

impl StrFormat {
    fn accepts(&self, s: &str) -> Result<(), String> {
        match self {
            Self::Any => Ok(()),
            Self::Url if is_valid_url(s) => Ok(()),
            Self::Url => Err(format!("expected a URL, found {s:?}")),
            Self::RelativePath => {
                if s.is_empty() {
                    Err("expected a relative path, found an empty string".to_string())
                } else if s.contains("://") || s.starts_with('/') || s.starts_with('\\') {
                    Err(format!("expected a relative path, found {s:?}"))
                } else {
                    Ok(())
                }
            }
            Self::Sha256 => Sha256Digest::parse_hex(s)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Self::OneOf(options) if options.contains(&s) => Ok(()),
            Self::OneOf(options) => Err(format!(
                "expected one of [{}], found {s:?}",
                options.join(", ")
            )),
        }
    }
}

/// One labelled alternative of a [`ValueShape::Union`].
#[derive(Debug, Clone)]
pub struct UnionArm {
    /// Name used in messages.
    pub label: &'static str,
    /// Shape of this alternative.
    pub shape: ValueShape,
}

/// Structural kind of a value.
#[derive(Debug, Clone)]
pub enum ValueShape {
    /// A string with a format constraint.
    Str(StrFormat),
    /// A signed integer.
    Int,
    /// A non-negative integer.
    UInt,
    /// Any number, including infinities.
    Number,
    /// A boolean.
    Boolean,
    /// Explicit null.
    Null,
    /// A format version (string or number).
    Version,
    /// A sequence whose items share a shape.
    List(Box<ValueShape>),
    /// A mapping from string keys to values of one shape.
    Map(Box<ValueShape>),
    /// A mapping with declared fields.
    Object(Vec<FieldSpec>),
    /// Alternatives tried in declaration order; the first match wins.
    Union(Vec<UnionArm>),
    /// Anything; never inspected.
    Opaque,
}

impl ValueShape {
    /// Any string.
    pub fn string() -> Self {
        Self::Str(StrFormat::Any)
    }

    /// One of a fixed set of string literals.
    pub fn one_of(options: &'static [&'static str]) -> Self {
        Self::Str(StrFormat::OneOf(options))
    }

    /// A list of `item`.
    pub fn list(item: ValueShape) -> Self {
        Self::List(Box::new(item))
    }

    /// A string-keyed map of `value`.
    pub fn map(value: ValueShape) -> Self {
        Self::Map(Box::new(value))
    }

    /// A union of labelled arms.
    pub fn union(arms: Vec<(&'static str, ValueShape)>) -> Self {
        Self::Union(
            arms.into_iter()
                .map(|(label, shape)| UnionArm { label, shape })
                .collect(),
        )
    }

    /// `Url | RelativePath`, in that order.
    pub fn file_source() -> Self {
        Self::union(vec![
            ("url", Self::Str(StrFormat::Url)),
            ("relative path", Self::Str(StrFormat::RelativePath)),
        ])
    }

    /// Whether `value` conforms, ignoring the normalized result.
    pub fn matches(&self, value: &Value) -> bool {
        let mut violations = Vec::new();
        self.conform(value, &FieldPath::root(), &mut violations);
        violations.is_empty()
    }

    /// The first union arm `value` conforms to. `None` for non-unions or
    /// when no arm matches.
    pub fn matching_arm(&self, value: &Value) -> Option<&UnionArm> {
        match self {
            Self::Union(arms) => arms.iter().find(|arm| arm.shape.matches(value)),
            _ => None,
        }
    }

    /// Check `value` and return its normalized form. Violations are
    /// appended; the returned value is meaningless if any were.
    pub(crate) fn conform(
        &self,
        value: &Value,
        path: &FieldPath,
        violations: &mut Vec<StructuralViolation>,
    ) -> Value {
        let tagged = value;
        let value = untagged(value);
        let fail = |violations: &mut Vec<StructuralViolation>, message: String| {
            violations.push(StructuralViolation {
                path: path.clone(),
                message,
            });
        };

        match (self, value) {
            (Self::Opaque, _) => tagged.clone(),
            (Self::Str(format), Value::String(s)) => {
                if let Err(message) = format.accepts(s) {
                    fail(violations, message);
                }
                value.clone()
            }
            (Self::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => value.clone(),
            (Self::UInt, Value::Number(n)) if n.is_u64() => value.clone(),
            (Self::Number, Value::Number(_)) => value.clone(),
            (Self::Boolean, Value::Bool(_)) => value.clone(),
            (Self::Null, Value::Null) => Value::Null,
            (Self::Version, v) => {
                if let Err(e) = VersionTag::from_value(v) {
                    fail(violations, e.to_string());
                }
                v.clone()
            }
            (Self::List(item), Value::Sequence(items)) => Value::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| item.conform(v, &path.index(i), violations))
                    .collect(),
            ),
            (Self::Map(inner), Value::Mapping(map)) => {
                let mut out = Mapping::new();
                for (k, v) in map {
                    let key = match k.as_str() {
                        Some(key) => key,
                        None => {
                            fail(violations, format!("keys must be strings, found {}", kind_name(k)));
                            continue;
                        }
                    };
                    out.insert(k.clone(), inner.conform(v, &path.key(key), violations));
                }
                Value::Mapping(out)
            }
            (Self::Object(fields), Value::Mapping(map)) => {
                Value::Mapping(conform_fields(fields, map, path, violations))
            }
            (Self::Union(arms), v) => {
                for arm in arms {
                    let mut scratch = Vec::new();
                    let out = arm.shape.conform(v, path, &mut scratch);
                    if scratch.is_empty() {
                        return out;
                    }
                }
                let labels: Vec<&str> = arms.iter().map(|a| a.label).collect();
                fail(
                    violations,
                    format!(
                    "expected one of: {}; found {}",
                    labels.join(" | "),
                    kind_name(v)
                    ),
                );
                v.clone()
            }
            (shape, v) => {
                fail(
                    violations,
                    format!("expected {}, found {}", shape.describe(), kind_name(v)),
                );
                v.clone()
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int => "integer",
            Self::UInt => "non-negative integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Version => "version",
            Self::List(_) => "sequence",
            Self::Map(_) | Self::Object(_) => "mapping",
            Self::Union(_) => "union",
            Self::Opaque => "any value",
        }
    }
}

fn conform_fields(
    fields: &[FieldSpec],
    map: &Mapping,
    path: &FieldPath,
    violations: &mut Vec<StructuralViolation>,
) -> Mapping {
    let mut out = Mapping::new();
    for (k, v) in map {
        let spec = k.as_str().and_then(|key| fields.iter().find(|f| f.name == key));
        match spec {
            Some(spec) if v.is_null() && !spec.required => {}
            Some(spec) => {
                let child = path.key(spec.name);
                if v.is_null() {
                    violations.push(StructuralViolation {
                        path: child,
                        message: "required field must not be null".to_string(),
                    });
                    continue;
                }
                out.insert(k.clone(), spec.shape.conform(v, &child, violations));
            }
            None => {
                out.insert(k.clone(), v.clone());
            }
        }
    }

    for spec in fields {
        if out.contains_key(spec.name) {
            continue;
        }
        let present_as_null = map.get(spec.name).is_some_and(Value::is_null);
        if spec.required && !present_as_null {
            violations.push(StructuralViolation {
                path: path.key(spec.name),
                message: "missing required field".to_string(),
            });
        } else if let Some(default) = &spec.default {
            out.insert(Value::from(spec.name), default.clone());
        }
    }
    out
}

// ─── Field specs ────────────────────────────────────────────────────

/// One declared field.
#[derive(Clone)]
pub struct FieldSpec {
    /// Key in the document.
    pub name: &'static str,
    /// Whether the field must be present and non-null.
    pub required: bool,
    /// Structural shape of the value.
    pub shape: ValueShape,
    /// Inserted when an optional field is absent or null.
    pub default: Option<Value>,
    /// Semantic check run during validation.
    pub validator: Option<FieldValidator>,
}

impl FieldSpec {
    /// A required field.
    pub fn required(name: &'static str, shape: ValueShape) -> Self {
        Self {
            name,
            required: true,
            shape,
            default: None,
            validator: None,
        }
    }

    /// An optional field.
    pub fn optional(name: &'static str, shape: ValueShape) -> Self {
        Self {
            required: false,
            ..Self::required(name, shape)
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach a field validator.
    pub fn validated(mut self, validator: FieldValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("shape", &self.shape)
            .field("default", &self.default)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

// ─── Violations ─────────────────────────────────────────────────────

/// A value that does not fit its declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralViolation {
    /// Location of the offending value.
    pub path: FieldPath,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.path, self.message)
    }
}

/// All structural violations of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StructuralViolations {
    violations: Vec<StructuralViolation>,
}

impl StructuralViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[StructuralViolation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<StructuralViolation> {
        self.violations
    }
}

impl fmt::Display for StructuralViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

// ─── Schema ─────────────────────────────────────────────────────────

/// Field set of one (resource type, format version).
#[derive(Debug, Clone)]
pub struct SchemaDescr {
    resource_type: ResourceTypeId,
    version: VersionTag,
    fields: Vec<FieldSpec>,
}

impl SchemaDescr {
    /// Build a schema from its ordered fields.
    pub fn new(resource_type: ResourceTypeId, version: VersionTag, fields: Vec<FieldSpec>) -> Self {
        Self {
            resource_type,
            version,
            fields,
        }
    }

    /// Resource type this schema describes.
    pub fn resource_type(&self) -> ResourceTypeId {
        self.resource_type
    }

    /// Format version this schema describes.
    pub fn version(&self) -> VersionTag {
        self.version
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a top-level field.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a top-level field is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Check a document without keeping the normalized result.
    pub fn check(&self, doc: &RawDocument) -> Result<(), StructuralViolations> {
        self.conform(doc).map(|_| ())
    }

    /// Check a document and return it normalized: defaults inserted, null
    /// optionals removed, union arms resolved.
    pub fn conform(&self, doc: &RawDocument) -> Result<Value, StructuralViolations> {
        let mut violations = Vec::new();
        let out = conform_fields(&self.fields, doc.as_mapping(), &FieldPath::root(), &mut violations);
        if violations.is_empty() {
            Ok(Value::Mapping(out))
        } else {
            Err(StructuralViolations { violations })
        }
    }
}
