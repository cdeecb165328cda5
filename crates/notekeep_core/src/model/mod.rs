//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical note record used by store, codec and UI layers.
//!
//! # Invariants
//! - Every note is identified by an integer `NoteId` unique in its collection.
//! - `updated` is carried as a literal string so import/export round-trips it.

pub mod note;
