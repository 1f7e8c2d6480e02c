// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process generation store.
//!
//! Readers see committed records only. Writers are serialized: a transaction
//! holds the writer lock from `begin` until commit or drop, buffers only its
//! own inserts, and applies them in one step on commit.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::error::{Result, SchemaError};
use crate::store::{
    Cursor, GenerationId, GenerationQuery, GenerationStore, SortOrder, StoredGeneration,
    StoredProperty, Transaction,
};

/// Generation and property records, keyed like the SQL tables.
#[derive(Debug, Default)]
struct MemoryState {
    generations: BTreeMap<GenerationId, StoredGeneration>,
    properties: BTreeMap<(GenerationId, u32), StoredProperty>,
}

impl MemoryState {
    fn latest(&self, type_name: &str) -> Option<&StoredGeneration> {
        self.generations
            .values()
            .filter(|g| g.type_name == type_name)
            .max_by_key(|g| g.generation)
    }

    fn properties_of(
        &self,
        generation_id: GenerationId,
    ) -> impl Iterator<Item = &StoredProperty> + '_ {
        self.properties
            .range((generation_id, 0)..=(generation_id, u32::MAX))
            .map(|(_, p)| p)
    }

    fn has_number(&self, type_name: &str, generation: u32) -> bool {
        self.generations
            .values()
            .any(|g| g.type_name == type_name && g.generation == generation)
    }
}

/// Generation store kept entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    writer: Mutex<()>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            writer: Mutex::new(()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of committed generation records.
    pub fn generation_count(&self) -> usize {
        self.state.read().generations.len()
    }

    /// Number of committed property records.
    pub fn property_count(&self) -> usize {
        self.state.read().properties.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationStore for MemoryStore {
    fn allocate_id(&self) -> Result<GenerationId> {
        Ok(GenerationId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn fetch_generations(&self, query: &GenerationQuery) -> Result<Cursor<StoredGeneration>> {
        let state = self.state.read();
        let mut matches: Vec<StoredGeneration> = state
            .generations
            .values()
            .filter(|g| g.type_name == query.type_name && query.filter.matches(g.generation))
            .cloned()
            .collect();
        matches.sort_by_key(|g| g.generation);
        if query.order == SortOrder::Descending {
            matches.reverse();
        }
        Ok(Cursor::from_vec(matches))
    }

    fn fetch_properties(&self, generation_id: GenerationId) -> Result<Cursor<StoredProperty>> {
        let state = self.state.read();
        Ok(Cursor::from_vec(
            state.properties_of(generation_id).cloned().collect(),
        ))
    }

    fn load_by_id(&self, generation_id: GenerationId) -> Result<StoredGeneration> {
        self.state
            .read()
            .generations
            .get(&generation_id)
            .cloned()
            .ok_or_else(|| {
                SchemaError::NotFound(format!("no generation with id {}", generation_id))
            })
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>> {
        let writer = self.writer.lock();
        Ok(Box::new(MemoryTransaction {
            store: self,
            _writer: writer,
            pending: MemoryState::default(),
        }))
    }
}

/// Buffered transaction over a [`MemoryStore`].
///
/// The writer lock keeps the committed state fixed while the transaction is
/// open, so inserts are checked against committed and pending records alike.
struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    _writer: MutexGuard<'a, ()>,
    pending: MemoryState,
}

impl MemoryTransaction<'_> {
    fn check_generation(&self, record: &StoredGeneration) -> Result<()> {
        let committed = self.store.state.read();
        let id = record.generation_id;
        if committed.generations.contains_key(&id) || self.pending.generations.contains_key(&id) {
            return Err(SchemaError::persist(format!("duplicate generation id {}", id)));
        }
        if committed.has_number(&record.type_name, record.generation)
            || self.pending.has_number(&record.type_name, record.generation)
        {
            return Err(SchemaError::persist(format!(
                "generation {}@{} already exists",
                record.type_name, record.generation
            )));
        }
        Ok(())
    }

    fn check_property(&self, record: &StoredProperty) -> Result<()> {
        let committed = self.store.state.read();
        let id = record.generation_id;
        if !committed.generations.contains_key(&id) && !self.pending.generations.contains_key(&id)
        {
            return Err(SchemaError::persist(format!(
                "property {} references unknown generation {}",
                record.name, id
            )));
        }
        let key = (id, record.ordinal);
        if committed.properties.contains_key(&key) || self.pending.properties.contains_key(&key) {
            return Err(SchemaError::persist(format!(
                "duplicate ordinal {} in generation {}",
                record.ordinal, id
            )));
        }
        let name_taken = committed
            .properties_of(id)
            .chain(self.pending.properties_of(id))
            .any(|p| p.name == record.name);
        if name_taken {
            return Err(SchemaError::persist(format!(
                "duplicate property {} in generation {}",
                record.name, id
            )));
        }
        Ok(())
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn allocate_id(&mut self) -> Result<GenerationId> {
        self.store.allocate_id()
    }

    fn insert_generation(&mut self, record: &StoredGeneration) -> Result<()> {
        self.check_generation(record)?;
        self.pending
            .generations
            .insert(record.generation_id, record.clone());
        Ok(())
    }

    fn insert_property(&mut self, record: &StoredProperty) -> Result<()> {
        self.check_property(record)?;
        self.pending
            .properties
            .insert((record.generation_id, record.ordinal), record.clone());
        Ok(())
    }

    fn fetch_latest(&mut self, type_name: &str) -> Result<Option<StoredGeneration>> {
        let committed = self.store.state.read();
        let latest = match (committed.latest(type_name), self.pending.latest(type_name)) {
            (Some(a), Some(b)) => Some(if b.generation > a.generation { b } else { a }),
            (a, b) => a.or(b),
        };
        Ok(latest.cloned())
    }

    fn fetch_properties(&mut self, generation_id: GenerationId) -> Result<Vec<StoredProperty>> {
        let committed = self.store.state.read();
        let merged: BTreeMap<u32, StoredProperty> = committed
            .properties_of(generation_id)
            .chain(self.pending.properties_of(generation_id))
            .map(|p| (p.ordinal, p.clone()))
            .collect();
        Ok(merged.into_values().collect())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut state = this.store.state.write();
        state.generations.extend(this.pending.generations);
        state.properties.extend(this.pending.properties);
        Ok(())
    }
}
