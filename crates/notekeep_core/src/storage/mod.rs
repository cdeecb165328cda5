//! Storage backends for the persisted note collection.
//!
//! # Responsibility
//! - Abstract the single key-value slot holding the serialized collection.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - A backend holds at most one value; `write` replaces it wholesale.
//! - Backends never interpret the stored bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

mod sqlite;

pub use sqlite::SqliteBackend;

/// Storage key under which the note collection is persisted.
pub const STORAGE_KEY: &str = "notesapp-notes";

pub type StorageResult<T> = Result<T, StorageError>;

/// Transport-level storage failure.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// The backing medium rejected the operation or is gone.
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Single-slot byte storage for the serialized note collection.
pub trait StorageBackend {
    /// Returns the stored value, or `None` when nothing has been written yet.
    fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the stored value wholesale.
    fn write(&self, bytes: &[u8]) -> StorageResult<()>;
}

/// Process-local backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory slot poisoned".to_string()))?;
        *slot = Some(bytes.to_vec());
        Ok(())
    }
}
