// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generation history for evolving record types.
//!
//! Every distinct shape a record type has had ("generation") is stored as an
//! immutable record with its ordered property list. Any past generation can
//! later be turned back into a minimal, decode-only type description, even
//! after the application code no longer defines that shape.
//!
//! # Features
//!
//! - **History**: generation numbers start at 0 and grow per type name;
//!   navigate with previous/next lookups
//! - **Structural equality**: compares shapes, ignoring ids and provenance
//! - **Reconstruction**: deterministic synthesis of a [`TypeDescription`],
//!   served through an eviction-tolerant LRU cache
//! - **Stores**: in-memory and SQLite backends behind one trait
//! - **Compatibility**: informational diff between two generations
//!
//! # Architecture
//!
//! ```text
//!   LiveType ──> SchemaRegistry ──commit──> Transaction
//!                     |                         |
//!                     v                         v
//!          ReconstructionCache          GenerationStore
//!                     |              (MemoryStore / SqliteStore)
//!                     v
//!             TypeSynthesizer ──> TypeDescription ──> TypeMaterializer
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use schema_history::{
//!     BuiltinTypes, GenerationStore, LiveProperty, LiveType, MemoryStore, SchemaRegistry,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let registry = SchemaRegistry::new(store.clone());
//!
//! let order = LiveType::builder("Order")
//!     .property(LiveProperty::new("id", "int64").primary_key())
//!     .property(LiveProperty::new("total", "float64"))
//!     .build();
//!
//! let mut txn = store.begin().unwrap();
//! let generation = registry.register_live_type(&order, txn.as_mut()).unwrap();
//! txn.commit().unwrap();
//!
//! let description = registry.reconstruct(&generation, &BuiltinTypes::new()).unwrap();
//! assert_eq!(description.field_names(), vec!["id", "total"]);
//! ```

pub mod cache;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod generation;
pub mod live;
pub mod memory;
pub mod property;
pub mod provenance;
pub mod registry;
pub mod sqlite;
pub mod store;
pub mod synth;

pub use cache::{CacheStats, ReconstructionCache};
pub use compatibility::{check_compatibility, Compatibility, CompatibilityResult};
pub use config::{ConfigError, RegistryConfig, RegistryConfigBuilder};
pub use error::{Result, SchemaError};
pub use generation::SchemaGeneration;
pub use live::{DescribeLayout, LiveProperty, LiveType};
pub use memory::MemoryStore;
pub use property::{plain_descriptor, PropertyDescriptor};
pub use registry::{HistoryEntry, SchemaRegistry};
pub use sqlite::SqliteStore;
pub use store::{
    Cursor, GenerationFilter, GenerationId, GenerationQuery, GenerationStore, SortOrder,
    StoredGeneration, StoredProperty, Transaction,
};
pub use synth::{
    structurally_equal, BuiltinTypes, LoadingContext, ResolveError, SynthesizedField,
    TypeDescription, TypeHandle, TypeKind, TypeMaterializer, TypeSynthesizer,
};
