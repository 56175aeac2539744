//! Input type definitions for deck export requests.
//!
//! These types describe what a caller hands to the exporter: the decks that
//! should exist in the collection and the cards to place in them. They
//! deserialize from the JSON request shape used by the CLI
//! (`{"decks": [...], "cards": [...]}`) with camelCase field names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// A deck that will exist in the exported collection.
///
/// # Examples
///
/// ```
/// use deckpack_core::Deck;
///
/// let deck = Deck::new(1, "Deck A");
/// assert_eq!(deck.id, 1);
/// assert_eq!(deck.name, "Deck A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck identifier, unique within one request.
    pub id: i64,
    /// Display name. `::` separates nested deck levels in the target application.
    pub name: String,
}

impl Deck {
    /// Creates a deck with the given id and name.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Note type a card is rendered with.
///
/// Every export contains both variants; a card picks one by name.
///
/// # Examples
///
/// ```
/// use deckpack_core::NoteKind;
///
/// assert_eq!(NoteKind::from_name("cloze"), Some(NoteKind::Cloze));
/// assert_eq!(NoteKind::from_name("unsupported"), None);
/// assert_eq!(NoteKind::default(), NoteKind::Basic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteKind {
    /// Front/Back question and answer.
    #[default]
    Basic,
    /// Single `Text` field with `{{c1::...}}` deletions.
    Cloze,
}

impl NoteKind {
    /// Returns the request-level name of this note type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Basic => "basic",
            NoteKind::Cloze => "cloze",
        }
    }

    /// Parses a request-level note type name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(NoteKind::Basic),
            "cloze" => Some(NoteKind::Cloze),
            _ => None,
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One card to export.
///
/// `front`/`back` are read for Basic cards and `text` for Cloze cards; the
/// unused fields are ignored.
///
/// # Examples
///
/// ```
/// use deckpack_core::{CardInput, NoteKind};
///
/// let card = CardInput::basic(1, "2+2", "4");
/// assert_eq!(card.note_kind().unwrap(), NoteKind::Basic);
///
/// let cloze = CardInput::cloze(1, "The sky is {{c1::blue}}.");
/// assert_eq!(cloze.note_kind().unwrap(), NoteKind::Cloze);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    /// Deck the card is placed in.
    pub deck_id: i64,
    /// Declared note type name; absent means `basic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,
    /// Question side of a Basic card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    /// Answer side of a Basic card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    /// Cloze text of a Cloze card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Note tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CardInput {
    /// Creates a Basic card without an explicit note type.
    pub fn basic(deck_id: i64, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            deck_id,
            front: Some(front.into()),
            back: Some(back.into()),
            ..Self::default()
        }
    }

    /// Creates a Cloze card.
    pub fn cloze(deck_id: i64, text: impl Into<String>) -> Self {
        Self {
            deck_id,
            note_type: Some(NoteKind::Cloze.as_str().to_string()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Adds a tag (builder pattern).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Resolves the declared note type, defaulting to Basic when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownNoteType`] when the declared name is
    /// neither `basic` nor `cloze`.
    pub fn note_kind(&self) -> Result<NoteKind, ValidationError> {
        match self.note_type.as_deref() {
            None => Ok(NoteKind::Basic),
            Some(name) => NoteKind::from_name(name)
                .ok_or_else(|| ValidationError::UnknownNoteType(name.to_string())),
        }
    }
}

/// A complete export request: decks plus the cards to place in them.
///
/// The first deck becomes the collection's current deck and the home deck
/// of both note types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Decks to create, in order.
    #[serde(default)]
    pub decks: Vec<Deck>,
    /// Cards to insert, in order.
    #[serde(default)]
    pub cards: Vec<CardInput>,
}

impl ExportRequest {
    /// Creates a request from decks and cards.
    pub fn new(decks: Vec<Deck>, cards: Vec<CardInput>) -> Self {
        Self { decks, cards }
    }

    /// Parses a request from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Note type of the first card, used to pick the collection's current
    /// model. Absent or unrecognized names fall back to Basic.
    pub fn active_note_kind(&self) -> NoteKind {
        self.cards
            .first()
            .and_then(|card| card.note_kind().ok())
            .unwrap_or_default()
    }
}
