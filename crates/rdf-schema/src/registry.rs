//! # Schema Registry
//!
//! Holds one [`SchemaDescr`] per (resource type, format version).
//!
//! ## Lifecycle
//!
//! A [`RegistryBuilder`] collects registrations and [`RegistryBuilder::build`]
//! checks them: duplicate keys and resource types without any schema are
//! [`ConfigurationError`]s raised at startup, never while a document is
//! processed. The resulting [`SchemaRegistry`] has no mutation API and is
//! `Send + Sync`, so one instance can be shared by every validation run.
//!
//! ## Version Admission
//!
//! Lookups are exact. Documents that declare an unregistered version are
//! classified first ([`VersionIndex::classify`]):
//!
//! - an unregistered patch of a registered `major.minor` is handled as the
//!   greatest registered patch below it;
//! - a version beyond the latest is handled as the latest (or rejected,
//!   depending on [`FutureVersionPolicy`]);
//! - anything else is unsupported.

use std::collections::{BTreeMap, BTreeSet};

use rdf_core::{
    ConfigurationError, DiscriminatorError, FutureVersionPolicy, ResourceTypeId, VersionTag,
};
use thiserror::Error;

use crate::definitions;
use crate::schema::SchemaDescr;

/// Exact lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaLookupError {
    /// No schema is registered under the key.
    #[error("no schema registered for {resource_type} {version}")]
    NotFound {
        /// Requested resource type.
        resource_type: ResourceTypeId,
        /// Requested format version.
        version: VersionTag,
    },
}

/// How a declared version relates to the registered ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownVersion {
    /// Registered as declared.
    Exact,
    /// Unregistered patch; handled as the contained registered version.
    PatchFallback(VersionTag),
    /// Newer than everything registered; the contained version is latest.
    Future(VersionTag),
    /// Older than or between registered minors.
    Unsupported,
}

/// Outcome of admitting a declared version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Resource type of the document.
    pub resource_type: ResourceTypeId,
    /// Version the document declares.
    pub declared: VersionTag,
    /// Registered version the document is processed as.
    pub effective: VersionTag,
    /// Classification of the declared version.
    pub known: KnownVersion,
}

impl Admission {
    /// Message describing a non-exact admission, if any.
    pub fn warning(&self) -> Option<String> {
        match self.known {
            KnownVersion::Exact | KnownVersion::Unsupported => None,
            KnownVersion::PatchFallback(v) => Some(format!(
                "format_version {} is not registered for {}; treated as {v}",
                self.declared, self.resource_type
            )),
            KnownVersion::Future(latest) => Some(format!(
                "format_version {} is newer than the latest known {latest} for {}; validated as {latest}",
                self.declared, self.resource_type
            )),
        }
    }
}

/// Registered versions per resource type.
///
/// Shared between the registry and the migration engine so that both admit
/// the same versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionIndex {
    versions: BTreeMap<ResourceTypeId, BTreeSet<VersionTag>>,
}

impl VersionIndex {
    /// Registered versions of a type, ascending.
    pub fn versions(&self, resource_type: ResourceTypeId) -> impl Iterator<Item = VersionTag> + '_ {
        self.versions
            .get(&resource_type)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether the exact version is registered.
    pub fn contains(&self, resource_type: ResourceTypeId, version: VersionTag) -> bool {
        self.versions
            .get(&resource_type)
            .is_some_and(|set| set.contains(&version))
    }

    /// Latest registered version of a type.
    pub fn latest(&self, resource_type: ResourceTypeId) -> Option<VersionTag> {
        self.versions
            .get(&resource_type)
            .and_then(|set| set.last().copied())
    }

    /// Classify a declared version against the registered ones.
    pub fn classify(&self, resource_type: ResourceTypeId, version: VersionTag) -> KnownVersion {
        let Some(set) = self.versions.get(&resource_type) else {
            return KnownVersion::Unsupported;
        };
        if set.contains(&version) {
            return KnownVersion::Exact;
        }
        if let Some(latest) = set.last().copied() {
            if version > latest {
                return KnownVersion::Future(latest);
            }
        }
        set.range(..version)
            .next_back()
            .filter(|below| below.same_minor(&version))
            .map_or(KnownVersion::Unsupported, |below| {
                KnownVersion::PatchFallback(*below)
            })
    }

    /// Classify and apply the future-version policy.
    pub fn admit(
        &self,
        resource_type: ResourceTypeId,
        declared: VersionTag,
        policy: FutureVersionPolicy,
    ) -> Result<Admission, DiscriminatorError> {
        let known = self.classify(resource_type, declared);
        let effective = match known {
            KnownVersion::Exact => declared,
            KnownVersion::PatchFallback(v) => v,
            KnownVersion::Future(latest) => match policy {
                FutureVersionPolicy::Accept => latest,
                FutureVersionPolicy::Reject => {
                    return Err(DiscriminatorError::FutureVersionRejected {
                        resource_type,
                        version: declared,
                        latest,
                    })
                }
            },
            KnownVersion::Unsupported => {
                return Err(DiscriminatorError::UnsupportedVersion {
                    resource_type,
                    version: declared,
                })
            }
        };
        Ok(Admission {
            resource_type,
            declared,
            effective,
            known,
        })
    }
}

/// Collects schema registrations.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schemas: Vec<SchemaDescr>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema. Duplicates are detected by [`RegistryBuilder::build`].
    pub fn register(&mut self, schema: SchemaDescr) -> &mut Self {
        self.schemas.push(schema);
        self
    }

    /// Add several schemas.
    pub fn register_all(&mut self, schemas: impl IntoIterator<Item = SchemaDescr>) -> &mut Self {
        self.schemas.extend(schemas);
        self
    }

    /// Check and freeze the registrations.
    pub fn build(self) -> Result<SchemaRegistry, ConfigurationError> {
        let mut schemas: BTreeMap<(ResourceTypeId, VersionTag), SchemaDescr> = BTreeMap::new();
        let mut index = VersionIndex::default();

        for schema in self.schemas {
            let key = (schema.resource_type(), schema.version());
            if schemas.contains_key(&key) {
                return Err(ConfigurationError::DuplicateSchema {
                    resource_type: key.0,
                    version: key.1,
                });
            }
            index.versions.entry(key.0).or_default().insert(key.1);
            schemas.insert(key, schema);
        }

        for resource_type in ResourceTypeId::ALL {
            if !index.versions.contains_key(&resource_type) {
                return Err(ConfigurationError::MissingResourceType(resource_type));
            }
        }

        tracing::debug!(schemas = schemas.len(), "schema registry built");
        Ok(SchemaRegistry { schemas, index })
    }
}

/// Frozen schema registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<(ResourceTypeId, VersionTag), SchemaDescr>,
    index: VersionIndex,
}

impl SchemaRegistry {
    /// Start a new registration.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The registry of all built-in schemas.
    pub fn standard() -> Result<Self, ConfigurationError> {
        let mut builder = RegistryBuilder::new();
        builder.register_all(definitions::standard_schemas());
        builder.build()
    }

    /// Exact lookup.
    pub fn lookup(
        &self,
        resource_type: ResourceTypeId,
        version: VersionTag,
    ) -> Result<&SchemaDescr, SchemaLookupError> {
        self.schemas
            .get(&(resource_type, version))
            .ok_or(SchemaLookupError::NotFound {
                resource_type,
                version,
            })
    }

    /// Latest registered version of a type.
    ///
    /// Every type has at least one schema once the registry is built.
    pub fn latest(&self, resource_type: ResourceTypeId) -> VersionTag {
        self.index
            .latest(resource_type)
            .unwrap_or(VersionTag::new(0, 0, 0))
    }

    /// Schema of the latest version of a type.
    pub fn latest_schema(
        &self,
        resource_type: ResourceTypeId,
    ) -> Result<&SchemaDescr, SchemaLookupError> {
        self.lookup(resource_type, self.latest(resource_type))
    }

    /// Classify a declared version. See [`VersionIndex::classify`].
    pub fn classify(&self, resource_type: ResourceTypeId, version: VersionTag) -> KnownVersion {
        self.index.classify(resource_type, version)
    }

    /// Registered versions per type.
    pub fn version_index(&self) -> &VersionIndex {
        &self.index
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn v(major: u32, minor: u32, patch: u32) -> VersionTag {
        VersionTag::new(major, minor, patch)
    }

    fn empty(resource_type: ResourceTypeId, version: VersionTag) -> SchemaDescr {
        SchemaDescr::new(resource_type, version, Vec::new())
    }

    fn one_per_type() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        for t in ResourceTypeId::ALL {
            builder.register(empty(t, v(0, 2, 0)));
        }
        builder
    }

    #[test]
    fn duplicate_schema_fails_build() {
        let mut builder = one_per_type();
        builder.register(empty(ResourceTypeId::Model, v(0, 2, 0)));
        assert_eq!(
            builder.build().unwrap_err(),
            ConfigurationError::DuplicateSchema {
                resource_type: ResourceTypeId::Model,
                version: v(0, 2, 0),
            }
        );
    }

    #[test]
    fn missing_type_fails_build() {
        let mut builder = RegistryBuilder::new();
        builder.register(empty(ResourceTypeId::Generic, v(0, 2, 0)));
        assert!(matches!(
            builder.build(),
            Err(ConfigurationError::MissingResourceType(_))
        ));
    }

    #[test]
    fn lookup_is_exact() {
        let registry = one_per_type().build().unwrap();
        assert!(registry.lookup(ResourceTypeId::Model, v(0, 2, 0)).is_ok());
        assert_eq!(
            registry.lookup(ResourceTypeId::Model, v(0, 2, 1)).unwrap_err(),
            SchemaLookupError::NotFound {
                resource_type: ResourceTypeId::Model,
                version: v(0, 2, 1),
            }
        );
    }

    #[test]
    fn standard_registry_builds() {
        let registry = SchemaRegistry::standard().unwrap();
        assert_eq!(registry.latest(ResourceTypeId::Model), v(0, 5, 3));
        assert_eq!(registry.latest(ResourceTypeId::Generic), v(0, 3, 0));
        assert_eq!(registry.latest(ResourceTypeId::Collection), v(0, 3, 0));
        assert_eq!(registry.version_index().versions(ResourceTypeId::Model).count(), 22);
        assert!(registry.latest_schema(ResourceTypeId::Dataset).is_ok());
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }

    #[test]
    fn classify_versions() {
        let registry = SchemaRegistry::standard().unwrap();
        let model = ResourceTypeId::Model;
        assert_eq!(registry.classify(model, v(0, 4, 9)), KnownVersion::Exact);
        assert_eq!(
            registry.classify(model, v(0, 4, 11)),
            KnownVersion::PatchFallback(v(0, 4, 10))
        );
        assert_eq!(registry.classify(model, v(0, 6, 0)), KnownVersion::Future(v(0, 5, 3)));
        assert_eq!(registry.classify(model, v(0, 2, 0)), KnownVersion::Unsupported);
    }

    #[test]
    fn admit_applies_future_policy() {
        let registry = SchemaRegistry::standard().unwrap();
        let index = registry.version_index();
        let generic = ResourceTypeId::Generic;

        let admitted = index
            .admit(generic, v(0, 9, 0), FutureVersionPolicy::Accept)
            .unwrap();
        assert_eq!(admitted.effective, v(0, 3, 0));
        assert!(admitted.warning().is_some());

        assert!(matches!(
            index.admit(generic, v(0, 9, 0), FutureVersionPolicy::Reject),
            Err(DiscriminatorError::FutureVersionRejected { .. })
        ));
        assert!(matches!(
            index.admit(generic, v(0, 1, 0), FutureVersionPolicy::Accept),
            Err(DiscriminatorError::UnsupportedVersion { .. })
        ));

        let exact = index.admit(generic, v(0, 2, 2), FutureVersionPolicy::Reject).unwrap();
        assert_eq!(exact.effective, v(0, 2, 2));
        assert_eq!(exact.warning(), None);
    }
}
