// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SQLite generation store.
//!
//! Durable storage for generation history on a single SQLite database.
//!
//! The connection sits behind a reentrant mutex (SQLite `Connection` is not
//! `Sync`). A write transaction holds the lock for its whole lifetime: other
//! threads wait for it to finish, while reads issued on the thread that owns
//! the transaction go through the same connection and see its uncommitted
//! rows.
//!
//! Fetches are eager: every matching row is read while the lock is held and
//! the returned [`Cursor`] iterates over that buffer.
//!
//! Generation ids come from an in-process counter seeded from the highest
//! stored id at open, so an id reserved by a rolled-back transaction is
//! never handed out again. One store instance per database file.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE generations (
//!     generation_id INTEGER PRIMARY KEY,
//!     type_name TEXT NOT NULL,
//!     generation INTEGER NOT NULL,
//!     created_at_millis INTEGER NOT NULL,
//!     created_by_user TEXT,
//!     created_on_host TEXT,
//!     UNIQUE (type_name, generation)
//! );
//! CREATE TABLE generation_properties (
//!     generation_id INTEGER NOT NULL REFERENCES generations(generation_id),
//!     ordinal INTEGER NOT NULL,
//!     name TEXT NOT NULL,
//!     ...
//!     PRIMARY KEY (generation_id, ordinal),
//!     UNIQUE (generation_id, name)
//! );
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::store::{
    Cursor, GenerationFilter, GenerationId, GenerationQuery, GenerationStore, SortOrder,
    StoredGeneration, StoredProperty, Transaction,
};

const GENERATION_COLUMNS: &str =
    "generation_id, type_name, generation, created_at_millis, created_by_user, created_on_host";

const PROPERTY_COLUMNS: &str = "generation_id, ordinal, name, type_name, nullable, is_version, \
     is_primary_key_member, adapter_type_name, adapter_params";

/// SQLite-backed [`GenerationStore`].
pub struct SqliteStore {
    conn: ReentrantMutex<Connection>,
    next_id: AtomicI64,
}

impl SqliteStore {
    /// Open (or create) a file-based database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            SchemaError::fetch_with(
                format!("failed to open SQLite database at {}", path.display()),
                e,
            )
        })?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            SchemaError::fetch_with("failed to create in-memory SQLite database", e)
        })?;
        Self::with_connection(conn)
    }

    /// Open the database named by `config.sqlite_path`, or an in-memory one.
    pub fn open_with_config(config: &RegistryConfig) -> Result<Self> {
        match &config.sqlite_path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        let highest: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(generation_id), 0) FROM generations",
                [],
                |row| row.get(0),
            )
            .map_err(|e| SchemaError::fetch_with("failed to read highest generation id", e))?;
        log::debug!("[SqliteStore::open] next generation id {}", highest + 1);
        Ok(Self {
            conn: ReentrantMutex::new(conn),
            next_id: AtomicI64::new(highest + 1),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS generations (
                generation_id INTEGER PRIMARY KEY,
                type_name TEXT NOT NULL,
                generation INTEGER NOT NULL,
                created_at_millis INTEGER NOT NULL,
                created_by_user TEXT,
                created_on_host TEXT,
                UNIQUE (type_name, generation)
            );

            CREATE TABLE IF NOT EXISTS generation_properties (
                generation_id INTEGER NOT NULL REFERENCES generations(generation_id),
                ordinal INTEGER NOT NULL,
                name TEXT NOT NULL,
                type_name TEXT NOT NULL,
                nullable INTEGER NOT NULL,
                is_version INTEGER NOT NULL,
                is_primary_key_member INTEGER NOT NULL,
                adapter_type_name TEXT,
                adapter_params TEXT,
                PRIMARY KEY (generation_id, ordinal),
                UNIQUE (generation_id, name)
            );

            CREATE INDEX IF NOT EXISTS idx_generations_type
                ON generations(type_name, generation);

            PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| SchemaError::persist_with("failed to initialize schema", e))?;
        Ok(())
    }

    fn reserve_id(&self) -> GenerationId {
        GenerationId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn row_to_generation(row: &rusqlite::Row) -> rusqlite::Result<StoredGeneration> {
        Ok(StoredGeneration {
            generation_id: GenerationId(row.get(0)?),
            type_name: row.get(1)?,
            generation: row.get(2)?,
            created_at_millis: row.get(3)?,
            created_by_user: row.get(4)?,
            created_on_host: row.get(5)?,
        })
    }

    fn row_to_property(row: &rusqlite::Row) -> rusqlite::Result<StoredProperty> {
        Ok(StoredProperty {
            generation_id: GenerationId(row.get(0)?),
            ordinal: row.get(1)?,
            name: row.get(2)?,
            type_name: row.get(3)?,
            nullable: row.get(4)?,
            is_version: row.get(5)?,
            is_primary_key_member: row.get(6)?,
            adapter_type_name: row.get(7)?,
            adapter_params: row.get(8)?,
        })
    }
}

fn query_properties(
    conn: &Connection,
    generation_id: GenerationId,
) -> Result<Vec<StoredProperty>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM generation_properties WHERE generation_id = ?1 ORDER BY ordinal ASC",
            PROPERTY_COLUMNS
        ))
        .map_err(|e| SchemaError::fetch_with("failed to prepare property query", e))?;

    let properties = stmt
        .query_map([generation_id.get()], SqliteStore::row_to_property)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| {
            SchemaError::fetch_with(
                format!("failed to read properties of generation {}", generation_id),
                e,
            )
        })?;
    Ok(properties)
}

impl GenerationStore for SqliteStore {
    fn allocate_id(&self) -> Result<GenerationId> {
        Ok(self.reserve_id())
    }

    fn fetch_generations(&self, query: &GenerationQuery) -> Result<Cursor<StoredGeneration>> {
        let conn = self.conn.lock();

        let (predicate, bound) = match query.filter {
            GenerationFilter::Any => ("", None),
            GenerationFilter::Exact(n) => (" AND generation = ?2", Some(n)),
            GenerationFilter::Below(n) => (" AND generation < ?2", Some(n)),
            GenerationFilter::Above(n) => (" AND generation > ?2", Some(n)),
        };
        let direction = match query.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {} FROM generations WHERE type_name = ?1{} ORDER BY generation {}",
            GENERATION_COLUMNS, predicate, direction
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| SchemaError::fetch_with("failed to prepare generation query", e))?;

        let rows = match bound {
            Some(n) => stmt.query_map(params![query.type_name, n], Self::row_to_generation),
            None => stmt.query_map(params![query.type_name], Self::row_to_generation),
        };
        let records = rows
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| SchemaError::fetch_with(format!("failed to query {}", query), e))?;

        Ok(Cursor::from_vec(records))
    }

    fn fetch_properties(&self, generation_id: GenerationId) -> Result<Cursor<StoredProperty>> {
        let conn = self.conn.lock();
        Ok(Cursor::from_vec(query_properties(&conn, generation_id)?))
    }

    fn load_by_id(&self, generation_id: GenerationId) -> Result<StoredGeneration> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!(
                "SELECT {} FROM generations WHERE generation_id = ?1",
                GENERATION_COLUMNS
            ),
            [generation_id.get()],
            Self::row_to_generation,
        )
        .optional()
        .map_err(|e| {
            SchemaError::fetch_with(format!("failed to load generation {}", generation_id), e)
        })?
        .ok_or_else(|| SchemaError::NotFound(format!("no generation with id {}", generation_id)))
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>> {
        let conn = self.conn.lock();
        if !conn.is_autocommit() {
            return Err(SchemaError::State(
                "a transaction is already open on this thread".to_string(),
            ));
        }
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| SchemaError::persist_with("failed to begin transaction", e))?;
        Ok(Box::new(SqliteTransaction {
            store: self,
            conn,
            finished: false,
        }))
    }
}

/// Write transaction holding the store's connection.
struct SqliteTransaction<'a> {
    store: &'a SqliteStore,
    conn: ReentrantMutexGuard<'a, Connection>,
    finished: bool,
}

impl Transaction for SqliteTransaction<'_> {
    fn allocate_id(&mut self) -> Result<GenerationId> {
        Ok(self.store.reserve_id())
    }

    fn insert_generation(&mut self, record: &StoredGeneration) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO generations ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    GENERATION_COLUMNS
                ),
                params![
                    record.generation_id.get(),
                    record.type_name,
                    record.generation,
                    record.created_at_millis,
                    record.created_by_user,
                    record.created_on_host,
                ],
            )
            .map_err(|e| {
                SchemaError::persist_with(
                    format!(
                        "failed to insert generation {}@{}",
                        record.type_name, record.generation
                    ),
                    e,
                )
            })?;
        Ok(())
    }

    fn insert_property(&mut self, record: &StoredProperty) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO generation_properties ({}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    PROPERTY_COLUMNS
                ),
                params![
                    record.generation_id.get(),
                    record.ordinal,
                    record.name,
                    record.type_name,
                    record.nullable,
                    record.is_version,
                    record.is_primary_key_member,
                    record.adapter_type_name,
                    record.adapter_params,
                ],
            )
            .map_err(|e| {
                SchemaError::persist_with(
                    format!(
                        "failed to insert property {} of generation {}",
                        record.name, record.generation_id
                    ),
                    e,
                )
            })?;
        Ok(())
    }

    fn fetch_latest(&mut self, type_name: &str) -> Result<Option<StoredGeneration>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM generations WHERE type_name = ?1 \
                     ORDER BY generation DESC LIMIT 1",
                    GENERATION_COLUMNS
                ),
                [type_name],
                SqliteStore::row_to_generation,
            )
            .optional()
            .map_err(|e| {
                SchemaError::fetch_with(format!("failed to read latest {}", type_name), e)
            })
    }

    fn fetch_properties(&mut self, generation_id: GenerationId) -> Result<Vec<StoredProperty>> {
        query_properties(&self.conn, generation_id)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        // A failed COMMIT leaves the transaction open; drop rolls it back.
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| SchemaError::persist_with("failed to commit transaction", e))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            log::debug!("[SqliteTransaction::drop] rollback failed: {}", e);
        }
    }
}
