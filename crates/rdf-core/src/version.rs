//! # Format Version Tags
//!
//! Defines `VersionTag`, the `(major, minor, patch)` triple declared by
//! every document in its `format_version` field.
//!
//! ## Ordering
//!
//! Tags compare numerically component by component. String comparison
//! would place `0.4.10` before `0.4.9`; the derived `Ord` on the field
//! order avoids that.
//!
//! ## Accepted Spellings
//!
//! - `"0.4.10"` — canonical three-part form.
//! - `"0.4"`, `"1"` — missing components default to zero.
//! - `0.3` — YAML loaders turn an unquoted two-part version into a float;
//!   its decimal rendering is parsed as a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use thiserror::Error;

/// A `format_version` that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version tag {input:?}: {reason}")]
pub struct VersionParseError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// A three-part format version with total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag {
    major: u32,
    minor: u32,
    patch: u32,
}

impl VersionTag {
    /// Construct a tag from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string with one to three numeric components.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let err = |reason| VersionParseError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(err("empty version"));
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in trimmed.split('.') {
            if count == 3 {
                return Err(err("more than three components"));
            }
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err("components must be non-negative integers"));
            }
            parts[count] = component
                .parse()
                .map_err(|_| err("component out of range"))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Read a version from a raw document value.
    ///
    /// Accepts strings and numbers. Floats are rendered with their shortest
    /// decimal form first, so `0.3` parses as `0.3.0`.
    pub fn from_value(value: &Value) -> Result<Self, VersionParseError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self::parse(&n.to_string()),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            other => Err(VersionParseError {
                input: format!("{other:?}"),
                reason: "expected a string or number",
            }),
        }
    }

    /// Major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component.
    pub fn patch(&self) -> u32 {
        self.patch
    }

    /// Whether both tags share `major.minor`.
    pub fn same_minor(&self, other: &VersionTag) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    /// Render as a YAML string value, the canonical persisted form.
    pub fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTag {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
