//! Core types for flashcard package export.
//!
//! This crate defines the data the exporter works with, independent of the
//! embedded database and archive container:
//!
//! - [`Deck`], [`CardInput`], [`ExportRequest`]: caller-supplied input.
//! - [`NoteKind`]: the two supported note types, Basic and Cloze.
//! - [`CollectionConfig`], [`DeckRecord`], [`DeckConfigRecord`],
//!   [`NoteTypeRecord`]: the JSON records seeded into the collection row.
//!
//! Validation ([`validate_request`]) catches dangling deck references,
//! duplicate deck ids, missing field content, and unsupported note types
//! before any database work starts.
//!
//! # Example
//!
//! ```
//! use deckpack_core::*;
//!
//! let request = ExportRequest::new(
//!     vec![Deck::new(1, "Deck A")],
//!     vec![
//!         CardInput::basic(1, "2+2", "4"),
//!         CardInput::cloze(1, "The sky is {{c1::blue}}."),
//!     ],
//! );
//!
//! assert_eq!(request.active_note_kind(), NoteKind::Basic);
//! assert!(validate_request(&request).is_empty());
//! ```

mod models;
mod types;
mod validate;

pub use models::*;
pub use types::*;
pub use validate::{ValidationError, validate_card, validate_request};
