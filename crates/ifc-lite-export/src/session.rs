// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export session
//!
//! The session owns everything one export run creates: the instance store,
//! the subtype cache and the counters. The schema registry is shared and
//! read-only. A session is used from one thread at a time.

use crate::{CacheStats, Handle, Instance, InstanceStore, SessionConfig, TypeCache};
use ifc_lite_schema::{EntityTypeId, Error, Result, SchemaRegistry, SchemaVersion, Severity};
use std::sync::Arc;

/// Counters for one export run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Instances in the store
    pub created: usize,
    /// Elements skipped by [`ExportSession::export_element`]
    pub skipped: usize,
}

/// State of one export run
#[derive(Debug)]
pub struct ExportSession {
    pub(crate) registry: Arc<SchemaRegistry>,
    version: Option<SchemaVersion>,
    pub(crate) config: SessionConfig,
    pub(crate) store: InstanceStore,
    pub(crate) cache: TypeCache,
    skipped: usize,
}

impl ExportSession {
    /// Create a session over a registry
    pub fn new(registry: Arc<SchemaRegistry>, config: SessionConfig) -> Self {
        let version = registry.identifier().parse().ok();
        log::debug!(
            "Export session opened on {} ({} entity types)",
            registry.identifier(),
            registry.len()
        );
        Self {
            registry,
            version,
            config,
            store: InstanceStore::new(),
            cache: TypeCache::new(),
            skipped: 0,
        }
    }

    /// Create a session over the bundled schema named in the config
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        let registry = ifc_lite_express::bundled_registry(config.schema)?;
        Ok(Self::new(registry, config))
    }

    /// Create a session over a bundled schema with default settings
    pub fn for_version(version: SchemaVersion) -> Result<Self> {
        Self::from_config(SessionConfig::default().with_schema(version))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Shared handle to the registry
    pub fn shared_registry(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    /// Bundled schema version matching the registry identifier, if any
    pub fn schema_version(&self) -> Option<SchemaVersion> {
        self.version
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of instances created so far
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Instances in creation order
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.store.iter()
    }

    /// Instance behind a handle
    pub fn instance(&self, handle: Handle) -> Option<&Instance> {
        self.store.resolve(handle)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            created: self.store.len(),
            skipped: self.skipped,
        }
    }

    /// Allocate an instance of `type_name` with every attribute unset
    ///
    /// Unknown type names are configuration errors; abstract types are
    /// schema violations.
    pub fn create_instance(&mut self, type_name: &str) -> Result<Handle> {
        let entity_type = self.concrete_type(type_name)?;
        let slots = self.registry.attributes_of(entity_type).len();
        let handle = self.store.push(entity_type, vec![None; slots]);
        log::trace!("created {}={}", handle, self.registry.type_name(entity_type));
        Ok(handle)
    }

    /// Run one element's construction
    ///
    /// Schema violations are logged and counted, and `Ok(None)` is returned
    /// so the caller can go on with the next element. Configuration and I/O
    /// errors are returned. Instances created by `f` before it failed stay
    /// in the store.
    pub fn export_element<T, F>(&mut self, label: &str, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.severity() == Severity::SkipEntity => {
                log::warn!("Skipping {}: {}", label, e);
                self.skipped += 1;
                Ok(None)
            }
            Err(e) => {
                log::error!("Export aborted at {}: {}", label, e);
                Err(e)
            }
        }
    }

    /// Look up a type that may be instantiated
    pub(crate) fn concrete_type(&self, type_name: &str) -> Result<EntityTypeId> {
        let entity_type = self.registry.lookup(type_name)?;
        if self
            .registry
            .entity(entity_type)
            .map(|e| e.is_abstract)
            .unwrap_or(false)
        {
            return Err(Error::AbstractEntity(
                self.registry.type_name(entity_type).to_string(),
            ));
        }
        Ok(entity_type)
    }

    /// Instance behind a non-null handle owned by this session
    pub(crate) fn resolve(&self, handle: Handle) -> Result<&Instance> {
        let id = handle
            .id()
            .ok_or_else(|| Error::invalid_argument("null handle"))?;
        self.store.resolve(handle).ok_or(Error::ForeignInstance(id))
    }
}
