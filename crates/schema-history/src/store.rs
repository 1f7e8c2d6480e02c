// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Persistence substrate abstraction.
//!
//! Defines the record shapes and the traits a storage backend implements to
//! hold generation history. The core only talks to these traits.
//!
//! # Implementations
//!
//! - `MemoryStore` -- in-process maps, for tests and embedded use
//! - `SqliteStore` -- durable storage on SQLite

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::property::PropertyDescriptor;

/// Process-global unique identifier of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(pub i64);

impl GenerationId {
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted generation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGeneration {
    pub generation_id: GenerationId,
    pub type_name: String,
    pub generation: u32,
    pub created_at_millis: i64,
    pub created_by_user: Option<String>,
    pub created_on_host: Option<String>,
}

/// Persisted property record, keyed by `(generation_id, ordinal)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProperty {
    pub generation_id: GenerationId,
    pub ordinal: u32,
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
    pub is_version: bool,
    pub is_primary_key_member: bool,
    pub adapter_type_name: Option<String>,
    pub adapter_params: Option<String>,
}

impl StoredProperty {
    pub fn from_descriptor(generation_id: GenerationId, property: &PropertyDescriptor) -> Self {
        Self {
            generation_id,
            ordinal: property.ordinal,
            name: property.name.clone(),
            type_name: property.type_name.clone(),
            nullable: property.nullable,
            is_version: property.is_version,
            is_primary_key_member: property.is_primary_key_member,
            adapter_type_name: property.adapter_type_name.clone(),
            adapter_params: property.adapter_params.clone(),
        }
    }

    pub fn into_descriptor(self) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.name,
            type_name: self.type_name,
            nullable: self.nullable,
            is_version: self.is_version,
            is_primary_key_member: self.is_primary_key_member,
            ordinal: self.ordinal,
            adapter_type_name: self.adapter_type_name,
            adapter_params: self.adapter_params,
        }
    }
}

/// Predicate on the generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationFilter {
    Any,
    Exact(u32),
    /// Strictly lower generations.
    Below(u32),
    /// Strictly higher generations.
    Above(u32),
}

impl GenerationFilter {
    pub fn matches(self, generation: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(n) => generation == n,
            Self::Below(n) => generation < n,
            Self::Above(n) => generation > n,
        }
    }
}

/// Ordering of a generation query, by generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filtered, ordered query over generation records of one type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationQuery {
    pub type_name: String,
    pub filter: GenerationFilter,
    pub order: SortOrder,
}

impl GenerationQuery {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            filter: GenerationFilter::Any,
            order: SortOrder::Ascending,
        }
    }

    pub fn filter(mut self, filter: GenerationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

impl fmt::Display for GenerationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.filter {
            GenerationFilter::Any => write!(f, "{}@*", self.type_name),
            GenerationFilter::Exact(n) => write!(f, "{}@{}", self.type_name, n),
            GenerationFilter::Below(n) => write!(f, "{}@<{}", self.type_name, n),
            GenerationFilter::Above(n) => write!(f, "{}@>{}", self.type_name, n),
        }
    }
}

type CursorIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Forward-only, non-restartable sequence of fetched records.
///
/// Callers that stop early must [`close`](Cursor::close) the cursor so the
/// backend can release what it holds; dropping it has the same effect.
/// Backends may buffer the whole result before returning the cursor
/// ([`SqliteStore`](crate::SqliteStore) does), in which case closing only
/// frees the buffer.
pub struct Cursor<T> {
    inner: Option<CursorIter<T>>,
}

impl<T> Cursor<T> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<T>> + Send + 'static,
    {
        Self {
            inner: Some(Box::new(iter)),
        }
    }

    pub fn from_vec(records: Vec<T>) -> Self
    where
        T: Send + 'static,
    {
        Self::new(records.into_iter().map(Ok))
    }

    pub fn empty() -> Self
    where
        T: Send + 'static,
    {
        Self::from_vec(Vec::new())
    }

    /// Release the underlying resources. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.as_mut()?.next();
        if next.is_none() {
            self.close();
        }
        next
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Storage backend holding generation and property records.
pub trait GenerationStore: Send + Sync {
    /// Reserve a fresh, never-used generation id.
    ///
    /// Ids are not reused after a rollback, so a cache keyed by id never
    /// confuses a discarded generation with a later one.
    fn allocate_id(&self) -> Result<GenerationId>;

    /// Fetch generation records matching `query`, in the requested order.
    fn fetch_generations(&self, query: &GenerationQuery) -> Result<Cursor<StoredGeneration>>;

    /// Fetch the property records of one generation, ordered by ordinal.
    fn fetch_properties(&self, generation_id: GenerationId) -> Result<Cursor<StoredProperty>>;

    /// Load a generation record by id.
    fn load_by_id(&self, generation_id: GenerationId) -> Result<StoredGeneration>;

    /// Start a write transaction. Dropping it without commit rolls back.
    fn begin(&self) -> Result<Box<dyn Transaction + '_>>;

    /// Load exactly one record matching `query`.
    ///
    /// Fails with [`SchemaError::NotFound`] on zero matches and with a fetch
    /// error when more than one record matches.
    fn load_one(&self, query: &GenerationQuery) -> Result<StoredGeneration> {
        let mut cursor = self.fetch_generations(query)?;
        let first = match cursor.next() {
            Some(record) => record?,
            None => return Err(SchemaError::NotFound(format!("no generation {}", query))),
        };
        let extra = cursor.next().transpose()?;
        cursor.close();
        match extra {
            None => Ok(first),
            Some(_) => Err(SchemaError::fetch(format!(
                "more than one generation matches {}",
                query
            ))),
        }
    }
}

/// Write transaction over a [`GenerationStore`].
///
/// Inserts become visible to other readers only after [`commit`](Transaction::commit).
pub trait Transaction {
    /// Reserve a fresh generation id without leaving the transaction.
    ///
    /// The id stays reserved when the transaction rolls back; it is never
    /// handed out again by the same store instance.
    fn allocate_id(&mut self) -> Result<GenerationId>;

    fn insert_generation(&mut self, record: &StoredGeneration) -> Result<()>;

    fn insert_property(&mut self, record: &StoredProperty) -> Result<()>;

    /// Highest-numbered generation of `type_name` visible to this transaction.
    fn fetch_latest(&mut self, type_name: &str) -> Result<Option<StoredGeneration>>;

    /// Properties of a generation visible to this transaction, by ordinal.
    fn fetch_properties(&mut self, generation_id: GenerationId) -> Result<Vec<StoredProperty>>;

    fn commit(self: Box<Self>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_filter_bounds_are_strict() {
        assert!(GenerationFilter::Below(3).matches(2));
        assert!(!GenerationFilter::Below(3).matches(3));
        assert!(GenerationFilter::Above(3).matches(4));
        assert!(!GenerationFilter::Above(3).matches(3));
        assert!(GenerationFilter::Exact(3).matches(3));
        assert!(GenerationFilter::Any.matches(0));
    }

    #[test]
    fn cursor_close_stops_iteration() {
        let mut cursor = Cursor::from_vec(vec![1, 2, 3]);
        assert_eq!(cursor.next().unwrap().unwrap(), 1);
        cursor.close();
        assert!(cursor.is_closed());
        assert!(cursor.next().is_none());
        cursor.close();
    }

    #[test]
    fn cursor_closes_itself_when_exhausted() {
        let mut cursor = Cursor::from_vec(vec!["only"]);
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_none());
        assert!(cursor.is_closed());
    }

    #[test]
    fn stored_property_round_trips_descriptor() {
        let prop = PropertyDescriptor::new("note", "string", 2)
            .nullable(true)
            .adapter("TrimAdapter", None);
        let stored = StoredProperty::from_descriptor(GenerationId(9), &prop);
        assert_eq!(stored.generation_id, GenerationId(9));
        assert_eq!(stored.into_descriptor(), prop);
    }

    #[test]
    fn query_display_names_the_filter() {
        let q = GenerationQuery::new("Order").filter(GenerationFilter::Below(2));
        assert_eq!(q.to_string(), "Order@<2");
    }
}
