//! # Latest Schema Tests
//!
//! Version classification against the standard registry, and validation of
//! documents that are already at the latest format.

use rdf_core::{EngineConfig, FieldPath, RawDocument, ResourceTypeId, Severity, VersionTag};
use rdf_schema::definitions::typed_version;
use rdf_schema::{materialize, validate, KnownVersion, SchemaRegistry, ValidationContext};

const MODEL_0_5_3: &str = include_str!("../../../fixtures/model-0.5.3.yaml");

fn registry() -> SchemaRegistry {
    SchemaRegistry::standard().expect("built-in schemas are consistent")
}

#[test]
fn every_type_has_a_typed_latest_version() {
    let registry = registry();
    for resource_type in ResourceTypeId::ALL {
        let latest = registry.latest(resource_type);
        assert_eq!(latest, typed_version(resource_type), "{resource_type}");
        assert!(registry.latest_schema(resource_type).is_ok());
    }
}

#[test]
fn model_versions_classify() {
    let registry = registry();
    let index = registry.version_index();
    let model = ResourceTypeId::Model;
    let cases = [
        (VersionTag::new(0, 5, 3), KnownVersion::Exact),
        (VersionTag::new(0, 4, 10), KnownVersion::Exact),
        (
            VersionTag::new(0, 4, 11),
            KnownVersion::PatchFallback(VersionTag::new(0, 4, 10)),
        ),
        (
            VersionTag::new(0, 5, 9),
            KnownVersion::Future(VersionTag::new(0, 5, 3)),
        ),
        (
            VersionTag::new(1, 0, 0),
            KnownVersion::Future(VersionTag::new(0, 5, 3)),
        ),
        (VersionTag::new(0, 2, 9), KnownVersion::Unsupported),
    ];
    for (version, expected) in cases {
        assert_eq!(index.classify(model, version), expected, "{version}");
    }
}

fn validate_yaml(yaml: &str, config: &EngineConfig) -> rdf_schema::ValidationSummary {
    let registry = registry();
    let doc = RawDocument::from_yaml_str(yaml).unwrap();
    let schema = registry.latest_schema(ResourceTypeId::Model).unwrap();
    let typed = materialize(doc, schema).unwrap();
    validate(&registry, &typed, &ValidationContext::new(config)).unwrap()
}

#[test]
fn latest_model_fixture_validates() {
    let summary = validate_yaml(MODEL_0_5_3, &EngineConfig::default());
    assert!(summary.is_valid(), "{summary}");
    assert_eq!(summary.warning_count(), 0, "{summary}");
}

#[test]
fn unknown_fields_follow_the_configured_severity() {
    let yaml = format!("{MODEL_0_5_3}run_on: gpu\n");

    let summary = validate_yaml(&yaml, &EngineConfig::default());
    let entry = &summary.entries()[0];
    assert_eq!(entry.severity, Severity::Warning);
    assert_eq!(entry.loc, FieldPath::field("run_on"));

    let strict = EngineConfig {
        unknown_fields: Severity::Error,
        ..EngineConfig::default()
    };
    let summary = validate_yaml(&yaml, &strict);
    assert!(!summary.is_valid());
    assert_eq!(summary.error_count(), 1);
}

#[test]
fn duplicate_tensor_ids_are_errors() {
    let yaml = MODEL_0_5_3.replace("  - id: probability", "  - id: raw");
    let summary = validate_yaml(&yaml, &EngineConfig::default());
    assert!(!summary.is_valid(), "{summary}");
}
