// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One generation of one logical record type.
//!
//! A [`SchemaGeneration`] is either hydrated from a stored record (its
//! properties are fetched on first access, then kept) or freshly derived from
//! a live type (properties known up front, generation number not yet
//! assigned). Both forms are immutable; committing an uncommitted generation
//! yields a new, committed value.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::error::{Result, SchemaError};
use crate::property::{check_ordinals, PropertyDescriptor};
use crate::provenance::Provenance;
use crate::store::{
    GenerationFilter, GenerationId, GenerationQuery, GenerationStore, SortOrder, StoredGeneration,
};

struct GenerationInner {
    store: Arc<dyn GenerationStore>,
    generation_id: GenerationId,
    type_name: String,
    generation: Option<u32>,
    created_at_millis: i64,
    created_by_user: Option<String>,
    created_on_host: Option<String>,
    properties: OnceLock<Vec<PropertyDescriptor>>,
}

/// Immutable description of one generation. Cheap to clone and share.
#[derive(Clone)]
pub struct SchemaGeneration {
    inner: Arc<GenerationInner>,
}

impl SchemaGeneration {
    /// Wrap a stored record; properties load lazily.
    pub(crate) fn hydrated(store: Arc<dyn GenerationStore>, record: StoredGeneration) -> Self {
        Self::from_parts(store, record, None)
    }

    /// Wrap a stored record whose properties are already known.
    pub(crate) fn hydrated_with(
        store: Arc<dyn GenerationStore>,
        record: StoredGeneration,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        Self::from_parts(store, record, Some(properties))
    }

    /// Build an uncommitted generation from a snapshot of a live type.
    pub(crate) fn uncommitted(
        store: Arc<dyn GenerationStore>,
        generation_id: GenerationId,
        type_name: String,
        provenance: Provenance,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(properties);
        Self {
            inner: Arc::new(GenerationInner {
                store,
                generation_id,
                type_name,
                generation: None,
                created_at_millis: provenance.created_at_millis,
                created_by_user: provenance.user,
                created_on_host: provenance.host,
                properties: cell,
            }),
        }
    }

    fn from_parts(
        store: Arc<dyn GenerationStore>,
        record: StoredGeneration,
        properties: Option<Vec<PropertyDescriptor>>,
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(properties) = properties {
            let _ = cell.set(properties);
        }
        Self {
            inner: Arc::new(GenerationInner {
                store,
                generation_id: record.generation_id,
                type_name: record.type_name,
                generation: Some(record.generation),
                created_at_millis: record.created_at_millis,
                created_by_user: record.created_by_user,
                created_on_host: record.created_on_host,
                properties: cell,
            }),
        }
    }

    /// Unique identifier of this generation.
    pub fn generation_id(&self) -> GenerationId {
        self.inner.generation_id
    }

    /// Fully-qualified logical type name.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Generation number, zero for the first recorded shape. `None` until
    /// committed.
    pub fn generation(&self) -> Option<u32> {
        self.inner.generation
    }

    pub fn is_committed(&self) -> bool {
        self.inner.generation.is_some()
    }

    pub fn created_at_millis(&self) -> i64 {
        self.inner.created_at_millis
    }

    /// Creation time; out-of-range timestamps clamp to the Unix epoch.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.inner.created_at_millis).unwrap_or_default()
    }

    pub fn created_by_user(&self) -> Option<&str> {
        self.inner.created_by_user.as_deref()
    }

    pub fn created_on_host(&self) -> Option<&str> {
        self.inner.created_on_host.as_deref()
    }

    pub(crate) fn store(&self) -> &Arc<dyn GenerationStore> {
        &self.inner.store
    }

    /// True once the property list is in memory.
    pub fn properties_loaded(&self) -> bool {
        self.inner.properties.get().is_some()
    }

    /// All properties, in ordinal order.
    ///
    /// The first call on a hydrated generation fetches them from the store;
    /// later calls reuse that result.
    pub fn properties(&self) -> Result<&[PropertyDescriptor]> {
        if let Some(properties) = self.inner.properties.get() {
            return Ok(properties);
        }

        let mut cursor = self.inner.store.fetch_properties(self.inner.generation_id)?;
        let mut loaded = Vec::new();
        for record in cursor.by_ref() {
            loaded.push(record?.into_descriptor());
        }
        cursor.close();

        if let Err(problem) = check_ordinals(&loaded) {
            log::warn!(
                "[SchemaGeneration::properties] {} has inconsistent properties: {}",
                self,
                problem
            );
        }

        // A concurrent loader may have won; either result is equivalent.
        let _ = self.inner.properties.set(loaded);
        self.inner
            .properties
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaError::State(format!("{} properties vanished", self)))
    }

    /// Properties that are not primary-key members, in ordinal order.
    pub fn data_properties(&self) -> Result<Vec<&PropertyDescriptor>> {
        Ok(self
            .properties()?
            .iter()
            .filter(|p| !p.is_primary_key_member)
            .collect())
    }

    /// Primary-key members, in ordinal order. May be empty.
    pub fn key_properties(&self) -> Result<Vec<&PropertyDescriptor>> {
        Ok(self
            .properties()?
            .iter()
            .filter(|p| p.is_primary_key_member)
            .collect())
    }

    /// Same type name and element-wise equal properties. Identity, number
    /// and creation metadata are ignored.
    pub fn structurally_equal(&self, other: &SchemaGeneration) -> Result<bool> {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return Ok(true);
        }
        Ok(self.type_name() == other.type_name() && self.properties()? == other.properties()?)
    }

    fn committed_number(&self) -> Result<u32> {
        self.inner
            .generation
            .ok_or_else(|| SchemaError::State(format!("{} is not committed", self)))
    }

    /// The generation numbered `generation` of this generation's type.
    pub fn generation_for(&self, generation: u32) -> Result<SchemaGeneration> {
        let query =
            GenerationQuery::new(self.type_name()).filter(GenerationFilter::Exact(generation));
        let record = self.inner.store.load_one(&query)?;
        Ok(Self::hydrated(Arc::clone(&self.inner.store), record))
    }

    /// Closest earlier generation of the same type, if any.
    pub fn previous_generation(&self) -> Result<Option<SchemaGeneration>> {
        let current = self.committed_number()?;
        if current == 0 {
            return Ok(None);
        }
        self.first_match(
            GenerationQuery::new(self.type_name())
                .filter(GenerationFilter::Below(current))
                .order_by(SortOrder::Descending),
        )
    }

    /// Closest later generation of the same type, if any.
    pub fn next_generation(&self) -> Result<Option<SchemaGeneration>> {
        let current = self.committed_number()?;
        self.first_match(
            GenerationQuery::new(self.type_name())
                .filter(GenerationFilter::Above(current))
                .order_by(SortOrder::Ascending),
        )
    }

    fn first_match(&self, query: GenerationQuery) -> Result<Option<SchemaGeneration>> {
        let mut cursor = self.inner.store.fetch_generations(&query)?;
        let first = cursor.next().transpose();
        cursor.close();
        Ok(first?.map(|record| Self::hydrated(Arc::clone(&self.inner.store), record)))
    }

    /// Stored form of this generation under the given number.
    pub(crate) fn to_record(&self, generation: u32) -> StoredGeneration {
        StoredGeneration {
            generation_id: self.inner.generation_id,
            type_name: self.inner.type_name.clone(),
            generation,
            created_at_millis: self.inner.created_at_millis,
            created_by_user: self.inner.created_by_user.clone(),
            created_on_host: self.inner.created_on_host.clone(),
        }
    }
}

impl fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.generation {
            Some(n) => write!(f, "{}@{}#{}", self.inner.type_name, n, self.inner.generation_id),
            None => write!(f, "{}@?#{}", self.inner.type_name, self.inner.generation_id),
        }
    }
}

impl fmt::Debug for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGeneration")
            .field("generation_id", &self.inner.generation_id)
            .field("type_name", &self.inner.type_name)
            .field("generation", &self.inner.generation)
            .field("created_at_millis", &self.inner.created_at_millis)
            .field("created_by_user", &self.inner.created_by_user)
            .field("created_on_host", &self.inner.created_on_host)
            .field("properties", &self.inner.properties.get())
            .finish()
    }
}
