//! Interchange codecs for the note collection.
//!
//! # Responsibility
//! - Convert between the in-memory collection and its XML document form.
//!
//! # Invariants
//! - Decoding either yields the full set of notes or fails; never a partial
//!   result.

pub mod xml;
