//! # Discriminator Resolution
//!
//! Reads `type` and `format_version` from a raw document. Nothing else in
//! the document is inspected, so resolution does not depend on key order
//! or on the presence of unrelated fields.
//!
//! A version newer than anything registered is *not* an error here; the
//! admission policy is applied by [`VersionIndex::admit`](crate::registry::VersionIndex::admit).

use rdf_core::document::kind_name;
use rdf_core::{DiscriminatorError, RawDocument, ResourceTypeId, VersionTag};
use serde_yaml::Value;

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("<{}>", kind_name(other)),
    }
}

/// Resource type and declared format version of a document.
pub fn resolve(doc: &RawDocument) -> Result<(ResourceTypeId, VersionTag), DiscriminatorError> {
    let resource_type = match doc.get("type") {
        Some(Value::String(literal)) => ResourceTypeId::from_type_literal(literal).ok_or_else(|| {
            DiscriminatorError::UnknownType {
                found: Some(literal.clone()),
            }
        })?,
        Some(other) if !other.is_null() => {
            return Err(DiscriminatorError::UnknownType {
                found: Some(render(other)),
            })
        }
        _ => return Err(DiscriminatorError::UnknownType { found: None }),
    };

    let version = match doc.get("format_version") {
        Some(value) if !value.is_null() => {
            VersionTag::from_value(value).map_err(|_| DiscriminatorError::UnknownVersion {
                found: Some(render(value)),
            })?
        }
        _ => return Err(DiscriminatorError::UnknownVersion { found: None }),
    };

    Ok((resource_type, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> RawDocument {
        RawDocument::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn reads_type_and_version() {
        let (t, v) = resolve(&doc("type: model\nformat_version: 0.4.10\n")).unwrap();
        assert_eq!(t, ResourceTypeId::Model);
        assert_eq!(v, VersionTag::new(0, 4, 10));
    }

    #[test]
    fn rdf_literal_is_generic() {
        let (t, _) = resolve(&doc("type: rdf\nformat_version: 0.2.0\n")).unwrap();
        assert_eq!(t, ResourceTypeId::Generic);
    }

    #[test]
    fn future_versions_resolve() {
        let (_, v) = resolve(&doc("type: model\nformat_version: 9.0.0\n")).unwrap();
        assert_eq!(v, VersionTag::new(9, 0, 0));
    }

    #[test]
    fn unknown_or_missing_type() {
        assert_eq!(
            resolve(&doc("type: workflow\nformat_version: 0.3.0\n")),
            Err(DiscriminatorError::UnknownType {
                found: Some("workflow".to_string())
            })
        );
        assert_eq!(
            resolve(&doc("format_version: 0.3.0\n")),
            Err(DiscriminatorError::UnknownType { found: None })
        );
        assert_eq!(
            resolve(&doc("type: [model]\nformat_version: 0.3.0\n")),
            Err(DiscriminatorError::UnknownType {
                found: Some("<sequence>".to_string())
            })
        );
    }

    #[test]
    fn unknown_or_missing_version() {
        assert_eq!(
            resolve(&doc("type: model\nformat_version: latest\n")),
            Err(DiscriminatorError::UnknownVersion {
                found: Some("latest".to_string())
            })
        );
        assert_eq!(
            resolve(&doc("type: model\n")),
            Err(DiscriminatorError::UnknownVersion { found: None })
        );
    }

    #[test]
    fn type_is_checked_before_version() {
        assert!(matches!(
            resolve(&doc("type: workflow\n")),
            Err(DiscriminatorError::UnknownType { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_yaml::Mapping;

    proptest! {
        #[test]
        fn key_order_does_not_matter(
            extra in proptest::collection::vec(("[a-z]{1,8}", 0u32..100), 0..6),
            rotation in 0usize..8,
        ) {
            let mut entries: Vec<(Value, Value)> = vec![
                (Value::from("type"), Value::from("model")),
                (Value::from("format_version"), Value::from("0.4.9")),
            ];
            for (key, value) in extra {
                if key != "type" && key != "format_version" {
                    entries.push((Value::from(key), Value::from(value)));
                }
            }
            let forward: Mapping = entries.iter().cloned().collect();
            let len = entries.len();
            entries.rotate_left(rotation % len);
            entries.reverse();
            let shuffled: Mapping = entries.into_iter().collect();

            let a = resolve(&RawDocument::from_mapping(forward).unwrap());
            let b = resolve(&RawDocument::from_mapping(shuffled).unwrap());
            prop_assert_eq!(a, b);
        }
    }
}
