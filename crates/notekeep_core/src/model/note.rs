//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its draft defaults.
//! - Provide timestamp stamping/parsing helpers shared by store and UI.
//!
//! # Invariants
//! - `id` 0 marks an unsaved draft; persisted notes carry a generated id.
//! - `updated` round-trips through import/export unchanged.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a note within the persisted collection.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// Sentinel id carried by drafts that have never been persisted.
pub const UNSAVED_NOTE_ID: NoteId = 0;

/// Title given to a freshly added note before the user edits it.
pub const DEFAULT_TITLE: &str = "新建笔记";

/// Body given to a freshly added note before the user edits it.
pub const DEFAULT_BODY: &str = "开始记录...";

/// Maximum characters shown in the list preview of a note body.
const PREVIEW_MAX_CHARS: usize = 60;

/// Canonical user-authored note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique within the collection. Generated by the store, or taken
    /// verbatim from an imported record.
    pub id: NoteId,
    pub title: String,
    pub body: String,
    /// RFC 3339 timestamp of the last create/edit, stored verbatim.
    pub updated: String,
}

impl Note {
    /// Creates an unsaved draft carrying the placeholder title and body.
    ///
    /// The store replaces the sentinel id and stamps `updated` on first save.
    pub fn draft() -> Self {
        Self {
            id: UNSAVED_NOTE_ID,
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            updated: String::new(),
        }
    }

    /// Parses `updated` as RFC 3339, returning `None` for anything else.
    pub fn parsed_updated(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.updated.trim()).ok()
    }

    /// Body preview for list rendering, truncated to 60 characters.
    pub fn preview(&self) -> String {
        let mut preview: String = self.body.chars().take(PREVIEW_MAX_CHARS).collect();
        if self.body.chars().count() > PREVIEW_MAX_CHARS {
            preview.push_str("...");
        }
        preview
    }
}

/// Returns the current UTC time in the stored `updated` format.
///
/// Millisecond precision with a `Z` suffix, e.g. `2026-08-07T09:30:00.123Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{now_timestamp, Note, DEFAULT_BODY, DEFAULT_TITLE, UNSAVED_NOTE_ID};

    fn note_with_body(body: &str) -> Note {
        Note {
            id: 7,
            title: "t".to_string(),
            body: body.to_string(),
            updated: String::new(),
        }
    }

    #[test]
    fn draft_carries_sentinel_id_and_placeholders() {
        let draft = Note::draft();
        assert_eq!(draft.id, UNSAVED_NOTE_ID);
        assert_eq!(draft.title, DEFAULT_TITLE);
        assert_eq!(draft.body, DEFAULT_BODY);
        assert!(draft.updated.is_empty());
    }

    #[test]
    fn now_timestamp_parses_back_as_rfc3339() {
        let mut note = note_with_body("");
        note.updated = now_timestamp();
        assert!(note.updated.ends_with('Z'));
        assert!(note.parsed_updated().is_some());
    }

    #[test]
    fn parsed_updated_rejects_non_timestamps() {
        let mut note = note_with_body("");
        for value in ["", "yesterday", "2026-13-99T99:99:99Z"] {
            note.updated = value.to_string();
            assert!(note.parsed_updated().is_none(), "accepted `{value}`");
        }
    }

    #[test]
    fn preview_truncates_long_bodies_with_marker() {
        let short = note_with_body("short body");
        assert_eq!(short.preview(), "short body");

        let long = note_with_body(&"x".repeat(80));
        assert_eq!(long.preview(), format!("{}...", "x".repeat(60)));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let body = "记".repeat(61);
        let note = note_with_body(&body);
        assert_eq!(note.preview(), format!("{}...", "记".repeat(60)));
    }
}
