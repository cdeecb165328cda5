//! XML document codec for the note collection.
//!
//! # Responsibility
//! - Encode a collection into the `<notes>` interchange document.
//! - Decode such documents back into notes, anchored on `<note>` containers.
//!
//! # Invariants
//! - `decode_notes(encode_notes(c))` reproduces `c` field for field (the
//!   store persists title/body trimmed; surrounding whitespace in field text
//!   is not significant in the interchange format).
//! - The `index` attribute on `<note>` is positional only and is ignored on
//!   decode.
//! - Field elements inside a `<note>` may appear in any order; all four are
//!   required.

use crate::model::note::{Note, NoteId};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ROOT_TAG: &str = "notes";
const NOTE_TAG: &str = "note";
const INDEX_ATTR: &str = "index";
const INDENT_SIZE: usize = 2;

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode/decode failure for the XML interchange format.
#[derive(Debug)]
pub enum CodecError {
    Xml(quick_xml::Error),
    /// A `<note>` element ended without one of the four required fields.
    MissingField(&'static str),
    /// `<id>` text did not parse as an integer.
    InvalidId(String),
    /// The document shape does not match the interchange format.
    UnexpectedStructure(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(err) => write!(f, "{err}"),
            Self::MissingField(field) => write!(f, "note element is missing `{field}`"),
            Self::InvalidId(value) => write!(f, "invalid note id `{value}`"),
            Self::UnexpectedStructure(message) => write!(f, "unexpected document: {message}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

/// Encodes notes into a pretty-printed XML document.
///
/// Each note becomes `<note index="N">` (1-based position, not the note id)
/// holding `id`, `body`, `title` and `updated` elements in that order. Empty
/// field values are written as self-closing elements.
pub fn encode_notes(notes: &[Note]) -> CodecResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;

    for (position, note) in notes.iter().enumerate() {
        let mut open = BytesStart::new(NOTE_TAG);
        open.push_attribute((INDEX_ATTR, (position + 1).to_string().as_str()));
        writer.write_event(Event::Start(open))?;
        write_field(&mut writer, "id", &note.id.to_string())?;
        write_field(&mut writer, "body", &note.body)?;
        write_field(&mut writer, "title", &note.title)?;
        write_field(&mut writer, "updated", &note.updated)?;
        writer.write_event(Event::End(BytesEnd::new(NOTE_TAG)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    String::from_utf8(writer.into_inner()).map_err(|_| {
        CodecError::UnexpectedStructure("encoder produced non-UTF-8 output".to_string())
    })
}

fn write_field<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &str,
) -> CodecResult<()> {
    // A Start/End pair around no text would pick up indentation whitespace;
    // empty values must stay self-closing to round-trip as empty strings.
    if value.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Body,
    Updated,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"id" => Some(Self::Id),
            b"title" => Some(Self::Title),
            b"body" => Some(Self::Body),
            b"updated" => Some(Self::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PartialNote {
    id: Option<String>,
    title: Option<String>,
    body: Option<String>,
    updated: Option<String>,
}

impl PartialNote {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Id => self.id = Some(value),
            Field::Title => self.title = Some(value),
            Field::Body => self.body = Some(value),
            Field::Updated => self.updated = Some(value),
        }
    }

    fn finish(self) -> CodecResult<Note> {
        let id_text = self.id.ok_or(CodecError::MissingField("id"))?;
        let id: NoteId = id_text
            .trim()
            .parse()
            .map_err(|_| CodecError::InvalidId(id_text))?;
        Ok(Note {
            id,
            title: self.title.ok_or(CodecError::MissingField("title"))?,
            body: self.body.ok_or(CodecError::MissingField("body"))?,
            updated: self.updated.ok_or(CodecError::MissingField("updated"))?,
        })
    }
}

/// Decodes an XML document into notes.
///
/// Reconstruction is anchored on `<note>` container elements; field order
/// inside a container is free and unknown elements are skipped. A field
/// element outside a `<note>` container is rejected, as is a container
/// missing any of the four fields. On any error no notes are returned.
pub fn decode_notes(xml: &str) -> CodecResult<Vec<Note>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut notes = Vec::new();
    let mut current: Option<PartialNote> = None;
    let mut open_field: Option<(Field, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let tag = start.name().as_ref().to_vec();
                if open_field.is_some() {
                    return Err(CodecError::UnexpectedStructure(
                        "element nested inside a note field".to_string(),
                    ));
                }
                if tag == NOTE_TAG.as_bytes() {
                    if current.is_some() {
                        return Err(CodecError::UnexpectedStructure(
                            "nested <note> element".to_string(),
                        ));
                    }
                    current = Some(PartialNote::default());
                } else if let Some(field) = Field::from_tag(&tag) {
                    if current.is_none() {
                        return Err(CodecError::UnexpectedStructure(format!(
                            "field element <{}> outside a <note> container",
                            String::from_utf8_lossy(&tag)
                        )));
                    }
                    open_field = Some((field, String::new()));
                } else if current.is_some() {
                    // Unknown element inside a note: skip its whole subtree.
                    let end = start.to_end().into_owned();
                    reader.read_to_end(end.name())?;
                }
                // Unknown elements outside notes (the root included) are
                // containers to descend into.
            }
            Event::Empty(empty) => {
                let tag = empty.name().as_ref().to_vec();
                if tag == NOTE_TAG.as_bytes() {
                    if current.is_some() {
                        return Err(CodecError::UnexpectedStructure(
                            "nested <note> element".to_string(),
                        ));
                    }
                    notes.push(PartialNote::default().finish()?);
                } else if let Some(field) = Field::from_tag(&tag) {
                    match current.as_mut() {
                        Some(partial) => partial.set(field, String::new()),
                        None => {
                            return Err(CodecError::UnexpectedStructure(format!(
                                "field element <{}> outside a <note> container",
                                String::from_utf8_lossy(&tag)
                            )));
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some((_, buffer)) = open_field.as_mut() {
                    buffer.push_str(&text.unescape()?);
                }
            }
            Event::End(end) => {
                if let Some((field, value)) = open_field.take() {
                    // check_end_names guarantees this end closes the field.
                    if let Some(partial) = current.as_mut() {
                        partial.set(field, value);
                    }
                } else if end.name().as_ref() == NOTE_TAG.as_bytes() {
                    if let Some(partial) = current.take() {
                        notes.push(partial.finish()?);
                    }
                }
            }
            Event::Eof => {
                if current.is_some() || open_field.is_some() {
                    return Err(CodecError::UnexpectedStructure(
                        "document ended inside a <note> element".to_string(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::{decode_notes, encode_notes, CodecError};
    use crate::model::note::Note;

    fn sample_notes() -> Vec<Note> {
        vec![
            Note {
                id: 421337,
                title: "groceries".to_string(),
                body: "milk & eggs <urgent>".to_string(),
                updated: "2026-08-01T10:00:00.000Z".to_string(),
            },
            Note {
                id: 7,
                title: "新建笔记".to_string(),
                body: String::new(),
                updated: "2026-08-02T11:30:00.500Z".to_string(),
            },
        ]
    }

    #[test]
    fn encode_produces_declared_pretty_document() {
        let xml = encode_notes(&sample_notes()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<notes>"));
        assert!(xml.contains("<note index=\"1\">"));
        assert!(xml.contains("<note index=\"2\">"));
        assert!(xml.contains("<id>421337</id>"));
        // Markup characters in user text must be escaped.
        assert!(!xml.contains("milk & eggs <urgent>"));
        assert!(xml.contains("&lt;urgent"));
    }

    #[test]
    fn encode_writes_empty_fields_self_closing() {
        let xml = encode_notes(&sample_notes()).unwrap();
        assert!(xml.contains("<body/>"));
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let notes = sample_notes();
        let decoded = decode_notes(&encode_notes(&notes).unwrap()).unwrap();
        assert_eq!(decoded, notes);
    }

    #[test]
    fn round_trip_preserves_multi_line_bodies() {
        let notes = vec![Note {
            id: 12,
            title: "lines".to_string(),
            body: "first line\nsecond line".to_string(),
            updated: "2026-08-03T00:00:00.000Z".to_string(),
        }];
        let decoded = decode_notes(&encode_notes(&notes).unwrap()).unwrap();
        assert_eq!(decoded, notes);
    }

    #[test]
    fn decode_accepts_reordered_fields_and_unknown_elements() {
        let xml = r#"<?xml version="1.0"?>
<notes>
  <note index="1">
    <updated>2026-08-01T10:00:00.000Z</updated>
    <title>out of order</title>
    <extra><nested>ignored</nested></extra>
    <body>still fine</body>
    <id>55</id>
  </note>
</notes>"#;
        let decoded = decode_notes(xml).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, 55);
        assert_eq!(decoded[0].title, "out of order");
        assert_eq!(decoded[0].body, "still fine");
    }

    #[test]
    fn decode_ignores_the_index_attribute() {
        let xml = r#"<notes><note index="99"><id>3</id><body>b</body><title>t</title><updated>u</updated></note></notes>"#;
        let decoded = decode_notes(xml).unwrap();
        assert_eq!(decoded[0].id, 3);
    }

    #[test]
    fn decode_reads_empty_field_elements_as_empty_strings() {
        let xml = r#"<notes><note><id>9</id><body/><title></title><updated/></note></notes>"#;
        let decoded = decode_notes(xml).unwrap();
        assert_eq!(decoded[0].body, "");
        assert_eq!(decoded[0].title, "");
        assert_eq!(decoded[0].updated, "");
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let xml = r#"<notes><note><id>9</id><title>t</title></note></notes>"#;
        match decode_notes(xml) {
            Err(CodecError::MissingField(field)) => assert!(field == "body" || field == "updated"),
            other => panic!("expected missing-field error, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_non_integer_ids() {
        let xml = r#"<notes><note><id>abc</id><body>b</body><title>t</title><updated>u</updated></note></notes>"#;
        assert!(matches!(decode_notes(xml), Err(CodecError::InvalidId(_))));
    }

    #[test]
    fn decode_rejects_field_elements_outside_a_note() {
        let xml = r#"<notes><id>1</id><title>t</title><body>b</body><updated>u</updated></notes>"#;
        assert!(matches!(
            decode_notes(xml),
            Err(CodecError::UnexpectedStructure(_))
        ));
    }

    #[test]
    fn decode_rejects_mismatched_end_tags() {
        assert!(matches!(
            decode_notes("<notes><note></wrong></notes>"),
            Err(CodecError::Xml(_))
        ));
    }

    #[test]
    fn decode_rejects_truncated_documents() {
        assert!(decode_notes("<notes><note><id>1</id>").is_err());
    }

    #[test]
    fn decode_of_empty_root_yields_no_notes() {
        assert!(decode_notes("<notes></notes>").unwrap().is_empty());
        assert!(decode_notes("<notes/>").unwrap().is_empty());
    }
}
