//! Export request validation.
//!
//! Catches requests that would otherwise produce a collection the target
//! application rejects or silently misfiles: cards pointing at decks that do
//! not exist, duplicate deck ids, missing field content, and note types
//! outside the supported pair.
//!
//! # Examples
//!
//! ```
//! use deckpack_core::*;
//!
//! let request = ExportRequest::new(
//!     vec![Deck::new(1, "Deck A")],
//!     vec![CardInput::basic(1, "2+2", "4")],
//! );
//! assert!(validate_request(&request).is_empty());
//!
//! // Card references a deck that is not part of the request
//! let bad = ExportRequest::new(
//!     vec![Deck::new(1, "Deck A")],
//!     vec![CardInput::basic(2, "2+2", "4")],
//! );
//! assert!(!validate_request(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CardInput, ExportRequest, NoteKind};

/// Request validation errors.
///
/// Card positions are zero-based indexes into [`ExportRequest::cards`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request contains no decks.
    #[error("at least one deck is required")]
    NoDecks,
    /// Two decks share an id.
    #[error("duplicate deck id: {0}")]
    DuplicateDeck(i64),
    /// A card names a deck id that is not in the request.
    #[error("card {card} references unknown deck {deck_id}")]
    UnknownDeck { card: usize, deck_id: i64 },
    /// A card declares a note type other than `basic` or `cloze`.
    #[error("unknown note type: {0}")]
    UnknownNoteType(String),
    /// A card lacks a field its note type requires.
    #[error("card {card} is missing required field '{field}' for {kind} notes")]
    MissingField {
        card: usize,
        kind: NoteKind,
        field: &'static str,
    },
}

/// Validates a full export request.
///
/// Checks deck ids first, then every card in order. All problems found are
/// returned; an empty vector means the request is exportable.
pub fn validate_request(request: &ExportRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if request.decks.is_empty() {
        errors.push(ValidationError::NoDecks);
    }

    let mut deck_ids: HashSet<i64> = HashSet::new();
    for deck in &request.decks {
        if !deck_ids.insert(deck.id) {
            errors.push(ValidationError::DuplicateDeck(deck.id));
        }
    }

    for (index, card) in request.cards.iter().enumerate() {
        if !deck_ids.contains(&card.deck_id) {
            errors.push(ValidationError::UnknownDeck {
                card: index,
                deck_id: card.deck_id,
            });
        }
        errors.extend(validate_card(index, card));
    }

    errors
}

/// Validates one card's note type and field content.
pub fn validate_card(index: usize, card: &CardInput) -> Vec<ValidationError> {
    let kind = match card.note_kind() {
        Ok(kind) => kind,
        Err(err) => return vec![err],
    };

    let required: Vec<(&'static str, bool)> = match kind {
        NoteKind::Basic => vec![("front", card.front.is_some()), ("back", card.back.is_some())],
        NoteKind::Cloze => vec![("text", card.text.is_some())],
    };

    required
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| ValidationError::MissingField {
            card: index,
            kind,
            field,
        })
        .collect()
}
