// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, ReconstructionCache};
use crate::config::{ConfigError, RegistryConfig};
use crate::error::{Result, SchemaError};
use crate::generation::SchemaGeneration;
use crate::live::{DescribeLayout, LiveType};
use crate::property::PropertyDescriptor;
use crate::provenance::Provenance;
use crate::store::{
    GenerationFilter, GenerationId, GenerationQuery, GenerationStore, SortOrder, StoredGeneration,
    StoredProperty, Transaction,
};
use crate::synth::{LoadingContext, TypeDescription, TypeHandle, TypeMaterializer, TypeSynthesizer};

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Generation a synthesized description was built from.
struct Origin {
    description: Weak<TypeDescription>,
    generation: SchemaGeneration,
}

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// One generation with its properties, as written by
/// [`SchemaRegistry::export_history`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub generation: StoredGeneration,
    pub properties: Vec<PropertyDescriptor>,
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

/// Entry point for generation history: lookup, navigation, creation,
/// commit and reconstruction.
pub struct SchemaRegistry {
    store: Arc<dyn GenerationStore>,
    cache: ReconstructionCache,
    synthesizer: TypeSynthesizer,
    capture_provenance: bool,
    /// Keyed by description address; stale entries are pruned on insert.
    origins: Mutex<HashMap<usize, Origin>>,
}

impl SchemaRegistry {
    /// Create a registry over `store` with default settings.
    pub fn new(store: Arc<dyn GenerationStore>) -> Self {
        Self::build(store, &RegistryConfig::default())
    }

    /// Create a registry over `store` using `config`.
    pub fn with_config(
        store: Arc<dyn GenerationStore>,
        config: &RegistryConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    fn build(store: Arc<dyn GenerationStore>, config: &RegistryConfig) -> Self {
        Self {
            store,
            cache: ReconstructionCache::new(config.cache_capacity),
            synthesizer: TypeSynthesizer::new(),
            capture_provenance: config.capture_provenance,
            origins: Mutex::new(HashMap::new()),
        }
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<dyn GenerationStore> {
        &self.store
    }

    // -- lookup -------------------------------------------------------------

    /// The generation numbered `generation` of `type_name`.
    pub fn generation_for(&self, type_name: &str, generation: u32) -> Result<SchemaGeneration> {
        let query = GenerationQuery::new(type_name).filter(GenerationFilter::Exact(generation));
        let record = self.store.load_one(&query)?;
        Ok(self.hydrate(record))
    }

    /// The generation with id `generation_id`.
    pub fn generation_by_id(&self, generation_id: GenerationId) -> Result<SchemaGeneration> {
        let record = self.store.load_by_id(generation_id)?;
        Ok(self.hydrate(record))
    }

    /// Highest-numbered committed generation of `type_name`.
    pub fn latest_generation(&self, type_name: &str) -> Result<Option<SchemaGeneration>> {
        self.first_match(&GenerationQuery::new(type_name).order_by(SortOrder::Descending))
    }

    /// Every committed generation of `type_name`, oldest first.
    pub fn history(&self, type_name: &str) -> Result<Vec<SchemaGeneration>> {
        let mut cursor = self.store.fetch_generations(&GenerationQuery::new(type_name))?;
        let mut history = Vec::new();
        for record in cursor.by_ref() {
            history.push(self.hydrate(record?));
        }
        cursor.close();
        Ok(history)
    }

    /// Whole history of `type_name` as pretty-printed JSON, oldest first.
    pub fn export_history(&self, type_name: &str) -> Result<String> {
        let mut entries = Vec::new();
        for generation in self.history(type_name)? {
            let properties = generation.properties()?.to_vec();
            let number = committed_number(&generation)?;
            entries.push(HistoryEntry {
                generation: generation.to_record(number),
                properties,
            });
        }
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Closest earlier generation of the same type. `None` at generation 0.
    pub fn previous_generation(
        &self,
        current: &SchemaGeneration,
    ) -> Result<Option<SchemaGeneration>> {
        let number = committed_number(current)?;
        if number == 0 {
            return Ok(None);
        }
        self.first_match(
            &GenerationQuery::new(current.type_name())
                .filter(GenerationFilter::Below(number))
                .order_by(SortOrder::Descending),
        )
    }

    /// Closest later generation of the same type.
    pub fn next_generation(&self, current: &SchemaGeneration) -> Result<Option<SchemaGeneration>> {
        let number = committed_number(current)?;
        self.first_match(
            &GenerationQuery::new(current.type_name())
                .filter(GenerationFilter::Above(number))
                .order_by(SortOrder::Ascending),
        )
    }

    fn first_match(&self, query: &GenerationQuery) -> Result<Option<SchemaGeneration>> {
        let mut cursor = self.store.fetch_generations(query)?;
        let first = cursor.next().transpose();
        cursor.close();
        Ok(first?.map(|record| self.hydrate(record)))
    }

    fn hydrate(&self, record: StoredGeneration) -> SchemaGeneration {
        SchemaGeneration::hydrated(Arc::clone(&self.store), record)
    }

    // -- write path ---------------------------------------------------------

    /// Snapshot `live` into a new, uncommitted generation.
    ///
    /// Join fields are left out; ordinals are assigned densely over the
    /// remaining fields in declaration order.
    pub fn create_from_live_type(&self, live: &LiveType) -> Result<SchemaGeneration> {
        let generation_id = self.store.allocate_id()?;
        Ok(self.uncommitted(generation_id, live))
    }

    /// Snapshot the live layout of `T`.
    pub fn create_for<T: DescribeLayout>(&self) -> Result<SchemaGeneration> {
        self.create_from_live_type(&T::live_type())
    }

    fn uncommitted(&self, generation_id: GenerationId, live: &LiveType) -> SchemaGeneration {
        SchemaGeneration::uncommitted(
            Arc::clone(&self.store),
            generation_id,
            live.type_name.clone(),
            self.provenance(),
            snapshot(live),
        )
    }

    fn provenance(&self) -> Provenance {
        if self.capture_provenance {
            Provenance::capture()
        } else {
            Provenance::timestamp_only()
        }
    }

    /// Insert `generation` as number `assigned` inside `txn`.
    ///
    /// The generation record goes first, then each property in ordinal
    /// order. The returned value describes the committed generation; it is
    /// only durable once the caller commits `txn`.
    pub fn commit(
        &self,
        generation: &SchemaGeneration,
        assigned: u32,
        txn: &mut dyn Transaction,
    ) -> Result<SchemaGeneration> {
        if generation.is_committed() {
            return Err(SchemaError::State(format!(
                "{} is already committed",
                generation
            )));
        }
        if !generation.properties_loaded() {
            return Err(SchemaError::State(format!(
                "{} has no properties to commit",
                generation
            )));
        }

        let mut properties = generation.properties()?.to_vec();
        properties.sort_by_key(|p| p.ordinal);

        let record = generation.to_record(assigned);
        txn.insert_generation(&record)?;
        for property in &properties {
            txn.insert_property(&StoredProperty::from_descriptor(record.generation_id, property))?;
        }

        log::info!(
            "[SchemaRegistry::commit] {}@{} recorded as generation {} ({} properties)",
            record.type_name,
            record.generation,
            record.generation_id,
            properties.len()
        );
        Ok(SchemaGeneration::hydrated_with(
            Arc::clone(generation.store()),
            record,
            properties,
        ))
    }

    /// Generation matching the current shape of `live`.
    ///
    /// Returns the latest generation when it is structurally equal to the
    /// live shape; otherwise records the live shape as the next number
    /// (0 for a new type) inside `txn`.
    pub fn register_live_type(
        &self,
        live: &LiveType,
        txn: &mut dyn Transaction,
    ) -> Result<SchemaGeneration> {
        let properties = snapshot(live);
        let latest = txn.fetch_latest(&live.type_name)?;

        let next = match latest {
            Some(record) => {
                let existing: Vec<PropertyDescriptor> = txn
                    .fetch_properties(record.generation_id)?
                    .into_iter()
                    .map(StoredProperty::into_descriptor)
                    .collect();
                if existing == properties {
                    log::debug!(
                        "[SchemaRegistry::register_live_type] {}@{} unchanged",
                        record.type_name,
                        record.generation
                    );
                    return Ok(SchemaGeneration::hydrated_with(
                        Arc::clone(&self.store),
                        record,
                        existing,
                    ));
                }
                record.generation.checked_add(1).ok_or_else(|| {
                    SchemaError::State(format!("{} has no generation numbers left", live.type_name))
                })?
            }
            None => 0,
        };

        let generation_id = txn.allocate_id()?;
        let candidate = self.uncommitted(generation_id, live);
        self.commit(&candidate, next, txn)
    }

    // -- reconstruction -----------------------------------------------------

    /// Decode-only description of `generation`, synthesized at most once per
    /// cache residency.
    pub fn reconstruct(
        &self,
        generation: &SchemaGeneration,
        context: &dyn LoadingContext,
    ) -> Result<Arc<TypeDescription>> {
        let id = generation.generation_id();
        // The store is never called under the cache lock: a writer holding
        // the store while it reconstructs would otherwise wait on us.
        if !generation.properties_loaded() && self.cache.get(id).is_none() {
            generation.properties()?;
        }

        let mut fresh = false;
        let description = self.cache.get_or_compute(id, || {
            fresh = true;
            self.synthesizer.synthesize(generation, context)
        })?;

        if fresh {
            let mut origins = self.origins.lock();
            origins.retain(|_, origin| origin.description.strong_count() > 0);
            origins.insert(
                Arc::as_ptr(&description) as usize,
                Origin {
                    description: Arc::downgrade(&description),
                    generation: generation.clone(),
                },
            );
        }
        Ok(description)
    }

    /// Generation a description returned by [`reconstruct`](Self::reconstruct)
    /// was built from.
    pub fn generation_of(&self, description: &Arc<TypeDescription>) -> Option<SchemaGeneration> {
        let origins = self.origins.lock();
        origins
            .get(&(Arc::as_ptr(description) as usize))
            .filter(|origin| {
                origin
                    .description
                    .upgrade()
                    .is_some_and(|known| Arc::ptr_eq(&known, description))
            })
            .map(|origin| origin.generation.clone())
    }

    /// Reconstruct `generation` and hand the description to `materializer`.
    pub fn materialize(
        &self,
        generation: &SchemaGeneration,
        context: &dyn LoadingContext,
        materializer: &dyn TypeMaterializer,
    ) -> Result<TypeHandle> {
        let description = self.reconstruct(generation, context)?;
        materializer
            .materialize(&description, context)
            .map_err(|reason| {
                SchemaError::Support(format!("cannot materialize {}: {}", generation, reason))
            })
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn committed_number(generation: &SchemaGeneration) -> Result<u32> {
    generation
        .generation()
        .ok_or_else(|| SchemaError::State(format!("{} is not committed", generation)))
}

/// Persistent properties of `live` with dense ordinals.
fn snapshot(live: &LiveType) -> Vec<PropertyDescriptor> {
    live.persistent_properties()
        .zip(0u32..)
        .map(|(p, ordinal)| PropertyDescriptor {
            name: p.name.clone(),
            type_name: p.type_name.clone(),
            nullable: p.nullable,
            is_version: p.is_version,
            is_primary_key_member: p.is_primary_key_member,
            ordinal,
            adapter_type_name: p.adapter_type_name.clone(),
            adapter_params: p.adapter_params.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveProperty;
    use crate::memory::MemoryStore;
    use crate::synth::{BuiltinTypes, ResolveError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingContext {
        inner: BuiltinTypes,
        calls: AtomicUsize,
    }

    impl CountingContext {
        fn new(inner: BuiltinTypes) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LoadingContext for CountingContext {
        fn resolve(&self, type_name: &str) -> std::result::Result<TypeHandle, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve(type_name)
        }
    }

    struct Recorder {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl TypeMaterializer for Recorder {
        fn materialize(
            &self,
            description: &TypeDescription,
            _context: &dyn LoadingContext,
        ) -> std::result::Result<TypeHandle, String> {
            self.seen.lock().push(description.name.clone());
            if self.fail {
                Err("no class loader".to_string())
            } else {
                Ok(TypeHandle::value(description.name.clone()))
            }
        }
    }

    /// Store whose every read fails like a dropped connection.
    #[derive(Default)]
    struct FailingStore {
        generation_reads: AtomicUsize,
        property_reads: AtomicUsize,
    }

    impl FailingStore {
        fn generation_reads(&self) -> usize {
            self.generation_reads.load(Ordering::SeqCst)
        }

        fn property_reads(&self) -> usize {
            self.property_reads.load(Ordering::SeqCst)
        }
    }

    impl GenerationStore for FailingStore {
        fn allocate_id(&self) -> Result<GenerationId> {
            Ok(GenerationId(1))
        }

        fn fetch_generations(
            &self,
            _query: &GenerationQuery,
        ) -> Result<crate::store::Cursor<StoredGeneration>> {
            self.generation_reads.fetch_add(1, Ordering::SeqCst);
            Err(SchemaError::fetch("connection reset"))
        }

        fn fetch_properties(
            &self,
            _generation_id: GenerationId,
        ) -> Result<crate::store::Cursor<StoredProperty>> {
            self.property_reads.fetch_add(1, Ordering::SeqCst);
            Err(SchemaError::fetch("connection reset"))
        }

        fn load_by_id(&self, _generation_id: GenerationId) -> Result<StoredGeneration> {
            self.generation_reads.fetch_add(1, Ordering::SeqCst);
            Err(SchemaError::fetch("connection reset"))
        }

        fn begin(&self) -> Result<Box<dyn Transaction + '_>> {
            Err(SchemaError::persist("read-only"))
        }
    }

    fn is_fetch(err: &SchemaError) -> bool {
        matches!(err, SchemaError::Fetch { .. }) && !err.is_not_found()
    }

    fn order_v0() -> LiveType {
        LiveType::builder("Order")
            .property(LiveProperty::new("id", "int64").primary_key())
            .property(LiveProperty::new("total", "float64"))
            .property(LiveProperty::new("note", "string").nullable())
            .build()
    }

    fn order_v1() -> LiveType {
        let mut live = order_v0();
        live.properties.push(LiveProperty::new("status", "string"));
        live
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(Arc::new(MemoryStore::new()))
    }

    fn record(registry: &SchemaRegistry, live: &LiveType) -> SchemaGeneration {
        let store = Arc::clone(registry.store());
        let mut txn = store.begin().unwrap();
        let generation = registry.register_live_type(live, txn.as_mut()).unwrap();
        txn.commit().unwrap();
        generation
    }

    #[test]
    fn create_skips_join_fields_and_numbers_densely() {
        let registry = registry();
        let live = LiveType::builder("Order")
            .property(LiveProperty::new("id", "int64").primary_key())
            .property(LiveProperty::new("customer", "Customer").join())
            .property(LiveProperty::new("total", "float64"))
            .build();

        let generation = registry.create_from_live_type(&live).unwrap();
        assert!(!generation.is_committed());
        let props = generation.properties().unwrap();
        let names: Vec<(&str, u32)> = props.iter().map(|p| (p.name.as_str(), p.ordinal)).collect();
        assert_eq!(names, vec![("id", 0), ("total", 1)]);
    }

    #[test]
    fn commit_assigns_number_and_persists() {
        let registry = registry();
        let candidate = registry.create_from_live_type(&order_v0()).unwrap();

        let store = Arc::clone(registry.store());
        let mut txn = store.begin().unwrap();
        let committed = registry.commit(&candidate, 0, txn.as_mut()).unwrap();
        txn.commit().unwrap();

        assert_eq!(committed.generation(), Some(0));
        assert_eq!(committed.generation_id(), candidate.generation_id());
        assert!(!candidate.is_committed());

        let loaded = registry.generation_for("Order", 0).unwrap();
        assert!(loaded.structurally_equal(&candidate).unwrap());
    }

    #[test]
    fn committing_twice_is_a_state_error() {
        let registry = registry();
        let committed = record(&registry, &order_v0());

        let store = Arc::clone(registry.store());
        let mut txn = store.begin().unwrap();
        let err = registry.commit(&committed, 1, txn.as_mut()).unwrap_err();
        assert!(matches!(err, SchemaError::State(_)));
    }

    #[test]
    fn register_reuses_equal_shape_and_bumps_on_change() {
        let registry = registry();
        let first = record(&registry, &order_v0());
        let again = record(&registry, &order_v0());
        let second = record(&registry, &order_v1());

        assert_eq!(first.generation(), Some(0));
        assert_eq!(again.generation_id(), first.generation_id());
        assert_eq!(second.generation(), Some(1));
        assert_eq!(registry.history("Order").unwrap().len(), 2);
        assert_eq!(
            registry.latest_generation("Order").unwrap().unwrap().generation(),
            Some(1)
        );
    }

    #[test]
    fn export_history_lists_every_generation() {
        let registry = registry();
        record(&registry, &order_v0());
        record(&registry, &order_v1());

        let json = registry.export_history("Order").unwrap();
        let entries: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].generation.generation, 0);
        assert_eq!(entries[1].properties.len(), 4);
        assert_eq!(entries[1].properties[3].name, "status");
        assert_eq!(registry.export_history("Missing").unwrap(), "[]");
    }

    #[test]
    fn lookups_report_not_found() {
        let registry = registry();
        assert!(registry.generation_for("Order", 0).unwrap_err().is_not_found());
        assert!(registry.generation_by_id(GenerationId(99)).unwrap_err().is_not_found());
        assert!(registry.latest_generation("Order").unwrap().is_none());
        assert!(registry.history("Order").unwrap().is_empty());
    }

    #[test]
    fn navigation_from_registry() {
        let registry = registry();
        let g0 = record(&registry, &order_v0());
        let g1 = record(&registry, &order_v1());

        assert!(registry.previous_generation(&g0).unwrap().is_none());
        assert_eq!(
            registry.next_generation(&g0).unwrap().unwrap().generation_id(),
            g1.generation_id()
        );
        assert_eq!(
            registry.previous_generation(&g1).unwrap().unwrap().generation_id(),
            g0.generation_id()
        );
        assert!(registry.next_generation(&g1).unwrap().is_none());

        let uncommitted = registry.create_from_live_type(&order_v0()).unwrap();
        assert!(matches!(
            registry.next_generation(&uncommitted).unwrap_err(),
            SchemaError::State(_)
        ));
    }

    #[test]
    fn store_failures_surface_as_fetch_errors_without_retry() {
        let store = Arc::new(FailingStore::default());
        let registry = SchemaRegistry::new(store.clone());

        assert!(is_fetch(&registry.generation_for("Order", 0).unwrap_err()));
        assert_eq!(store.generation_reads(), 1);
        assert!(is_fetch(&registry.generation_by_id(GenerationId(7)).unwrap_err()));
        assert_eq!(store.generation_reads(), 2);
        assert!(is_fetch(&registry.latest_generation("Order").unwrap_err()));
        assert_eq!(store.generation_reads(), 3);

        let known = SchemaGeneration::hydrated(
            store.clone(),
            StoredGeneration {
                generation_id: GenerationId(7),
                type_name: "Order".to_string(),
                generation: 2,
                created_at_millis: 0,
                created_by_user: None,
                created_on_host: None,
            },
        );
        assert!(is_fetch(&registry.previous_generation(&known).unwrap_err()));
        assert_eq!(store.generation_reads(), 4);

        assert!(is_fetch(&known.properties().unwrap_err()));
        assert_eq!(store.property_reads(), 1);
        assert!(!known.properties_loaded());

        let context = CountingContext::new(BuiltinTypes::new());
        assert!(is_fetch(&registry.reconstruct(&known, &context).unwrap_err()));
        assert_eq!(store.property_reads(), 2);
        assert_eq!(context.calls(), 0);
        assert_eq!(registry.cache_stats().misses, 0);
    }

    #[test]
    fn reconstruct_synthesizes_once() {
        let registry = registry();
        let generation = record(&registry, &order_v0());
        let context = CountingContext::new(BuiltinTypes::new());

        let a = registry.reconstruct(&generation, &context).unwrap();
        let resolved = context.calls();
        let b = registry.reconstruct(&generation, &context).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resolved, 3);
        assert_eq!(context.calls(), resolved);
        assert_eq!(registry.cache_stats().hits, 1);
        assert_eq!(registry.cache_stats().misses, 1);
    }

    #[test]
    fn failed_synthesis_is_retried() {
        let registry = registry();
        let live = LiveType::builder("Event")
            .property(LiveProperty::new("at", "Instant"))
            .build();
        let generation = record(&registry, &live);

        let err = registry
            .reconstruct(&generation, &BuiltinTypes::new())
            .unwrap_err();
        assert!(matches!(err, SchemaError::Support(_)));

        let description = registry
            .reconstruct(&generation, &BuiltinTypes::new().with_value("Instant"))
            .unwrap();
        assert_eq!(description.field_names(), vec!["at"]);
    }

    #[test]
    fn generation_of_maps_back() {
        let registry = registry();
        let generation = record(&registry, &order_v0());
        let description = registry.reconstruct(&generation, &BuiltinTypes::new()).unwrap();

        let origin = registry.generation_of(&description).unwrap();
        assert_eq!(origin.generation_id(), generation.generation_id());

        let stranger = Arc::new((*description).clone());
        assert!(registry.generation_of(&stranger).is_none());
    }

    #[test]
    fn materialize_delegates_and_maps_failure() {
        let registry = registry();
        let generation = record(&registry, &order_v0());

        let ok = Recorder {
            seen: Mutex::new(Vec::new()),
            fail: false,
        };
        let handle = registry
            .materialize(&generation, &BuiltinTypes::new(), &ok)
            .unwrap();
        assert_eq!(handle.name, "Order");
        assert_eq!(*ok.seen.lock(), vec!["Order".to_string()]);

        let broken = Recorder {
            seen: Mutex::new(Vec::new()),
            fail: true,
        };
        let err = registry
            .materialize(&generation, &BuiltinTypes::new(), &broken)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Support(_)));
    }

    #[test]
    fn with_config_validates() {
        let store: Arc<dyn GenerationStore> = Arc::new(MemoryStore::new());
        let bad = RegistryConfig {
            cache_capacity: 0,
            ..RegistryConfig::default()
        };
        assert!(SchemaRegistry::with_config(Arc::clone(&store), &bad).is_err());

        let quiet = RegistryConfig::builder()
            .capture_provenance(false)
            .build()
            .unwrap();
        let registry = SchemaRegistry::with_config(store, &quiet).unwrap();
        let generation = registry.create_from_live_type(&order_v0()).unwrap();
        assert!(generation.created_by_user().is_none());
        assert!(generation.created_on_host().is_none());
    }

    #[test]
    fn create_for_uses_described_layout() {
        struct Invoice;

        impl DescribeLayout for Invoice {
            fn live_type() -> LiveType {
                LiveType::builder("Invoice")
                    .property(LiveProperty::new("number", "int64").primary_key())
                    .build()
            }
        }

        let generation = registry().create_for::<Invoice>().unwrap();
        assert_eq!(generation.type_name(), "Invoice");
        assert_eq!(generation.key_properties().unwrap().len(), 1);
    }
}
