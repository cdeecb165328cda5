//! SQLite-backed key-value storage.
//!
//! # Responsibility
//! - Open file or in-memory databases holding the single `local_store` table.
//! - Persist the serialized collection under the fixed storage key.
//!
//! # Invariants
//! - Schema setup is idempotent and completes before any read/write.
//! - `write` fully replaces the row for the storage key.

use super::{StorageBackend, StorageError, StorageResult, STORAGE_KEY};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS local_store (
    key   TEXT PRIMARY KEY,
    value BLOB NOT NULL
);";

/// Key-value slot backed by one row of a SQLite table.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) a database file and prepares the schema.
    ///
    /// # Side effects
    /// - Emits `storage_open` logging events.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        info!("event=storage_open module=storage status=start mode=file");
        let conn = match Connection::open(path) {
            Ok(conn) => conn,
            Err(err) => {
                error!("event=storage_open module=storage status=error mode=file error={err}");
                return Err(err.into());
            }
        };
        let backend = Self::with_connection(conn)?;
        info!("event=storage_open module=storage status=ok mode=file");
        Ok(backend)
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection mutex poisoned".to_string()))
    }
}

impl StorageBackend for SqliteBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_store WHERE key = ?1;",
                [STORAGE_KEY],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO local_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![STORAGE_KEY, bytes],
        )?;
        Ok(())
    }
}
