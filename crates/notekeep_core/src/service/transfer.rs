//! Import/export use-cases bridging the codec and the store.
//!
//! # Responsibility
//! - Gate imports on the accepted XML content types.
//! - Drive decode -> merge with no partial effects.
//! - Package exports as a downloadable document description.
//!
//! # Invariants
//! - A rejected or undecodable import never mutates the store.
//! - Exporting an empty collection produces no document.

use crate::codec::xml::{decode_notes, encode_notes, CodecError, CodecResult};
use crate::storage::StorageBackend;
use crate::store::note_store::{NoteStore, StoreError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// File name offered for exported collections.
pub const EXPORT_FILE_NAME: &str = "notes.xml";

/// Content type attached to exported collections.
pub const EXPORT_CONTENT_TYPE: &str = "application/xml";

/// The only content types accepted for import.
pub const ACCEPTED_IMPORT_TYPES: [&str; 2] = ["application/xml", "text/xml"];

/// Import failure.
#[derive(Debug)]
pub enum ImportError {
    /// The chosen file is not an XML document.
    UnsupportedContentType(String),
    /// The document did not decode; the store was not touched.
    Decode(CodecError),
    /// The merged collection could not be rewritten.
    Store(StoreError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedContentType(content_type) => write!(
                f,
                "invalid file type `{content_type}`; select an XML file"
            ),
            Self::Decode(err) => write!(f, "failed to decode notes document: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsupportedContentType(_) => None,
            Self::Decode(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Notes decoded from the document.
    pub decoded: usize,
    /// Notes actually added after id deduplication.
    pub added: usize,
}

/// Export payload: file name, content type and document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub contents: String,
}

/// Import/export facade over a note store.
pub struct TransferService<'store, B: StorageBackend> {
    store: &'store NoteStore<B>,
}

impl<'store, B: StorageBackend> TransferService<'store, B> {
    pub fn new(store: &'store NoteStore<B>) -> Self {
        Self { store }
    }

    /// Imports an XML document into the store.
    ///
    /// # Errors
    /// - `UnsupportedContentType` when `content_type` is not an accepted XML
    ///   type; the store is untouched.
    /// - `Decode` when the document does not decode; the store is untouched.
    /// - `Store` when rewriting the merged collection fails.
    pub fn import_document(
        &self,
        content_type: &str,
        xml: &str,
    ) -> Result<ImportReport, ImportError> {
        if !is_accepted_import_type(content_type) {
            error!("event=import module=service status=rejected content_type={content_type}");
            return Err(ImportError::UnsupportedContentType(content_type.to_string()));
        }

        let decoded = match decode_notes(xml) {
            Ok(notes) => notes,
            Err(err) => {
                error!("event=import module=service status=error stage=decode error={err}");
                return Err(ImportError::Decode(err));
            }
        };

        let decoded_count = decoded.len();
        let added = self.store.merge_imported(decoded)?;
        info!("event=import module=service status=ok decoded={decoded_count} added={added}");
        Ok(ImportReport {
            decoded: decoded_count,
            added,
        })
    }

    /// Encodes the current collection as a downloadable document.
    ///
    /// Returns `Ok(None)` when the store holds no notes.
    pub fn export_document(&self) -> CodecResult<Option<ExportDocument>> {
        let notes = self.store.list();
        if notes.is_empty() {
            info!("event=export module=service status=skipped reason=empty");
            return Ok(None);
        }

        let contents = encode_notes(&notes)?;
        info!(
            "event=export module=service status=ok notes={}",
            notes.len()
        );
        Ok(Some(ExportDocument {
            file_name: EXPORT_FILE_NAME,
            content_type: EXPORT_CONTENT_TYPE,
            contents,
        }))
    }
}

/// Maps a file path to the content type a file picker would report.
pub fn content_type_for_path(path: impl AsRef<Path>) -> &'static str {
    match path
        .as_ref()
        .extension()
        .and_then(|extension| extension.to_str())
    {
        Some(extension) if extension.eq_ignore_ascii_case("xml") => "application/xml",
        Some(extension) if extension.eq_ignore_ascii_case("txt") => "text/plain",
        Some(extension) if extension.eq_ignore_ascii_case("json") => "application/json",
        _ => "application/octet-stream",
    }
}

fn is_accepted_import_type(content_type: &str) -> bool {
    ACCEPTED_IMPORT_TYPES
        .iter()
        .any(|accepted| *accepted == content_type)
}

#[cfg(test)]
mod tests {
    use super::{content_type_for_path, is_accepted_import_type};

    #[test]
    fn only_the_two_xml_types_are_accepted() {
        assert!(is_accepted_import_type("application/xml"));
        assert!(is_accepted_import_type("text/xml"));
        assert!(!is_accepted_import_type("text/plain"));
        assert!(!is_accepted_import_type("application/XML"));
        assert!(!is_accepted_import_type(""));
    }

    #[test]
    fn content_type_follows_the_file_extension() {
        assert_eq!(content_type_for_path("backup/notes.xml"), "application/xml");
        assert_eq!(content_type_for_path("NOTES.XML"), "application/xml");
        assert_eq!(content_type_for_path("readme.txt"), "text/plain");
        assert_eq!(content_type_for_path("data.json"), "application/json");
        assert_eq!(
            content_type_for_path("unknown.bin"),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for_path("no_extension"),
            "application/octet-stream"
        );
    }
}
