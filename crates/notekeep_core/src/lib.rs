//! Core domain logic for Notekeep.
//! This crate is the single source of truth for business invariants.

pub mod codec;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use codec::xml::{decode_notes, encode_notes, CodecError, CodecResult};
pub use logging::{default_log_level, init_logging};
pub use model::note::{
    now_timestamp, Note, NoteId, DEFAULT_BODY, DEFAULT_TITLE, UNSAVED_NOTE_ID,
};
pub use service::transfer::{
    content_type_for_path, ExportDocument, ImportError, ImportReport, TransferService,
    ACCEPTED_IMPORT_TYPES, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};
pub use storage::{
    MemoryBackend, SqliteBackend, StorageBackend, StorageError, StorageResult, STORAGE_KEY,
};
pub use store::note_store::{NoteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
