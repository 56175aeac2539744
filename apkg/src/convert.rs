//! Conversion of input cards into `notes`/`cards` rows.
//!
//! Every input card becomes exactly one note and one card. The note carries
//! the field content; the card carries the deck placement and a fresh,
//! never-reviewed scheduling state ([`FRESH_CARD`]).
//!
//! # Field encoding
//!
//! - Basic: `flds = front + U+001F + back`, `sfld = front`
//! - Cloze: `flds = sfld = text`
//!
//! The note checksum is [`compute_csum`] of the sort field.

use deckpack_core::{CardInput, NoteKind, ValidationError};
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::ids::{IdAllocator, compute_csum, new_guid};
use crate::schema::ModelIds;

/// Separator between field values in `notes.flds`.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Scheduling state of a freshly added card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDefaults {
    pub ord: i64,
    pub usn: i64,
    pub card_type: i64,
    pub queue: i64,
    pub due: i64,
    pub ivl: i64,
    pub factor: i64,
    pub reps: i64,
    pub lapses: i64,
    pub left: i64,
    pub odue: i64,
    pub odid: i64,
    pub flags: i64,
}

/// A new card: template 0, in the new queue, never reviewed.
pub const FRESH_CARD: CardDefaults = CardDefaults {
    ord: 0,
    usn: 0,
    card_type: 0,
    queue: 0,
    due: 0,
    ivl: 0,
    factor: 0,
    reps: 0,
    lapses: 0,
    left: 0,
    odue: 0,
    odid: 0,
    flags: 0,
};

/// A row of the `notes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: i64,
    pub guid: String,
    pub model_id: i64,
    pub modified: i64,
    pub usn: i64,
    pub tags: String,
    pub fields: String,
    pub sort_field: String,
    pub checksum: i64,
    pub flags: i64,
    pub data: String,
}

/// A row of the `cards` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub id: i64,
    pub note_id: i64,
    pub deck_id: i64,
    pub modified: i64,
    pub state: CardDefaults,
    pub data: String,
}

/// The note and card produced from one input card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRows {
    pub note: NoteRow,
    pub card: CardRow,
}

/// Returns `(flds, sfld)` for `card` rendered as `kind`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] if a field required by `kind`
/// is absent. `index` is the card's position, used in the error.
pub fn note_fields(
    index: usize,
    card: &CardInput,
    kind: NoteKind,
) -> std::result::Result<(String, String), ValidationError> {
    let require = |field: &'static str, value: &Option<String>| {
        value.clone().ok_or(ValidationError::MissingField {
            card: index,
            kind,
            field,
        })
    };

    match kind {
        NoteKind::Cloze => {
            let text = require("text", &card.text)?;
            Ok((text.clone(), text))
        }
        NoteKind::Basic => {
            let front = require("front", &card.front)?;
            let back = require("back", &card.back)?;
            Ok((format!("{front}{FIELD_SEPARATOR}{back}"), front))
        }
    }
}

/// Formats tags as the space-delimited column value (` a b `).
///
/// Whitespace inside a tag becomes `_`; empty tags are dropped.
pub fn format_tags(tags: &[String]) -> String {
    let cleaned: Vec<String> = tags
        .iter()
        .map(|tag| {
            tag.trim()
                .chars()
                .map(|c| if c.is_whitespace() { '_' } else { c })
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .collect();

    if cleaned.is_empty() {
        String::new()
    } else {
        format!(" {} ", cleaned.join(" "))
    }
}

/// Builds the note and card rows for one input card.
///
/// Ids are allocated only after the note type and fields are known to be
/// valid, so a rejected card does not advance the allocator.
///
/// # Errors
///
/// Returns [`ExportError::UnknownNoteType`](crate::ExportError::UnknownNoteType)
/// for note types other than `basic`/`cloze`, or
/// [`ExportError::InvalidInput`](crate::ExportError::InvalidInput) if a
/// required field is missing. Propagates
/// [`ExportError::IdsExhausted`](crate::ExportError::IdsExhausted) from the
/// allocator.
pub fn build_rows(
    index: usize,
    input: &CardInput,
    model_ids: &ModelIds,
    modified: i64,
    ids: &mut IdAllocator,
) -> Result<BuiltRows> {
    let kind = input.note_kind()?;
    let (fields, sort_field) = note_fields(index, input, kind)?;
    let checksum = compute_csum(&sort_field);

    let note = NoteRow {
        id: ids.next_note_id()?,
        guid: new_guid(),
        model_id: model_ids.get(kind),
        modified,
        usn: 0,
        tags: format_tags(&input.tags),
        fields,
        sort_field,
        checksum,
        flags: 0,
        data: String::new(),
    };

    let card = CardRow {
        id: ids.next_card_id()?,
        note_id: note.id,
        deck_id: input.deck_id,
        modified,
        state: FRESH_CARD,
        data: String::new(),
    };

    Ok(BuiltRows { note, card })
}

/// Inserts a note row.
pub fn insert_note(conn: &Connection, note: &NoteRow) -> Result<()> {
    conn.execute(
        "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            note.id,
            note.guid,
            note.model_id,
            note.modified,
            note.usn,
            note.tags,
            note.fields,
            note.sort_field,
            note.checksum,
            note.flags,
            note.data,
        ],
    )?;
    Ok(())
}

/// Inserts a card row.
pub fn insert_card(conn: &Connection, card: &CardRow) -> Result<()> {
    let s = &card.state;
    conn.execute(
        "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor, \
         reps, lapses, left, odue, odid, flags, data) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            card.id,
            card.note_id,
            card.deck_id,
            s.ord,
            card.modified,
            s.usn,
            s.card_type,
            s.queue,
            s.due,
            s.ivl,
            s.factor,
            s.reps,
            s.lapses,
            s.left,
            s.odue,
            s.odid,
            s.flags,
            card.data,
        ],
    )?;
    Ok(())
}
