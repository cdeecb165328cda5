//! Persistence authority for the note collection.
//!
//! # Responsibility
//! - Own list/upsert/delete/merge semantics over the single stored collection.
//! - Isolate serialization and ordering rules from service/UI layers.
//!
//! # Invariants
//! - The store is the only writer of the storage slot.
//! - Every mutation rewrites the collection in full; there is no partial write.

pub mod note_store;
