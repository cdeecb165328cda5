//! Note store over an injected storage backend.
//!
//! # Responsibility
//! - Provide list/upsert/delete/merge operations on the persisted collection.
//! - Keep id assignment and recency ordering inside the persistence boundary.
//!
//! # Invariants
//! - Readers always observe the collection sorted by `updated` descending.
//! - Ids are unique within the collection; merge keeps the first occurrence.
//! - Unreadable or corrupt storage reads as an empty collection, never an
//!   error; write failures propagate to the caller.

use crate::model::note::{now_timestamp, Note, NoteId};
use crate::storage::{StorageBackend, StorageError};
use log::warn;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Generated ids are drawn from `GENERATED_ID_MIN..GENERATED_ID_MAX`.
/// 0 stays reserved for the unsaved-draft sentinel.
const GENERATED_ID_MIN: NoteId = 1;
const GENERATED_ID_MAX: NoteId = 1_000_000;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while rewriting the persisted collection.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize note collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Single authority over the persisted note collection.
pub struct NoteStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> NoteStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns all notes, most recently updated first.
    ///
    /// Never fails: an empty, unreadable or corrupt storage slot yields an
    /// empty vector (the failure is logged at warn level).
    pub fn list(&self) -> Vec<Note> {
        let mut notes = self.load();
        sort_most_recent_first(&mut notes);
        notes
    }

    /// Creates or updates one note.
    ///
    /// A note whose id matches an existing entry replaces that entry's title
    /// and body; any other id (the draft sentinel included) gets a freshly
    /// generated id and is appended. `updated` is stamped to now either way,
    /// and title/body are stored trimmed.
    ///
    /// Returns the note as stored.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the backend rejects the rewrite.
    pub fn upsert(&self, note: Note) -> StoreResult<Note> {
        let mut notes = self.load();
        let title = note.title.trim().to_string();
        let body = note.body.trim().to_string();
        let updated = now_timestamp();

        let stored = match notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(existing) => {
                existing.title = title;
                existing.body = body;
                existing.updated = updated;
                existing.clone()
            }
            None => {
                let fresh = Note {
                    id: generate_id(&notes),
                    title,
                    body,
                    updated,
                };
                notes.push(fresh.clone());
                fresh
            }
        };

        self.persist(&notes)?;
        Ok(stored)
    }

    /// Removes the note with the given id; an absent id is a no-op.
    pub fn delete_by_id(&self, id: NoteId) -> StoreResult<()> {
        let mut notes = self.load();
        notes.retain(|note| note.id != id);
        self.persist(&notes)
    }

    /// Merges imported notes into the collection.
    ///
    /// The current collection comes first and duplicates by id keep the first
    /// occurrence, so existing notes win over imported ones sharing an id.
    /// Imported notes keep their `id` and `updated` values verbatim.
    ///
    /// Returns how many imported notes were actually added; callers use the
    /// completed merge as the signal to refresh dependent views.
    pub fn merge_imported(&self, imported: Vec<Note>) -> StoreResult<usize> {
        let mut notes = self.load();
        let mut seen: HashSet<NoteId> = notes.iter().map(|note| note.id).collect();
        let mut added = 0usize;
        for note in imported {
            if seen.insert(note.id) {
                notes.push(note);
                added += 1;
            }
        }
        self.persist(&notes)?;
        Ok(added)
    }

    fn load(&self) -> Vec<Note> {
        let bytes = match self.backend.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("event=store_read module=store status=error error={err}");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(notes) => notes,
            Err(err) => {
                warn!("event=store_decode module=store status=error error={err}");
                Vec::new()
            }
        }
    }

    fn persist(&self, notes: &[Note]) -> StoreResult<()> {
        let bytes = serde_json::to_vec(notes)?;
        self.backend.write(&bytes)?;
        Ok(())
    }
}

/// Sorts notes by `updated` descending; unparseable timestamps sort last.
///
/// The sort is stable, so equal timestamps keep their stored order.
fn sort_most_recent_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| match (a.parsed_updated(), b.parsed_updated()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Picks a random id in the generated range not used by any current note.
fn generate_id(notes: &[Note]) -> NoteId {
    let mut rng = rand::rng();
    loop {
        let candidate = rng.random_range(GENERATED_ID_MIN..GENERATED_ID_MAX);
        if notes.iter().all(|note| note.id != candidate) {
            return candidate;
        }
    }
}
