//! Flashcard package export.
//!
//! This crate turns an [`ExportRequest`](deckpack_core::ExportRequest) into
//! the bytes of an importable package: a zip archive holding a SQLite
//! collection seeded with the application's schema, configuration, note
//! types, decks, and one note plus one card per input card.
//!
//! # Architecture
//!
//! - **`schema`**: schema template and seed-script generation
//! - **`ids`**: note/card id allocation and sort-field checksums
//! - **`convert`**: input card → `notes`/`cards` rows
//! - **`engine`**: in-memory SQLite driver and image export
//! - **`package`**: zip container
//! - **`export`**: orchestration ([`Exporter`])
//! - **`config`**: YAML-loadable [`ExportConfig`]
//!
//! # Quick start
//!
//! ```
//! use deckpack_apkg::Exporter;
//! use deckpack_core::{CardInput, Deck, ExportRequest};
//!
//! let request = ExportRequest::new(
//!     vec![Deck::new(1, "Deck A")],
//!     vec![
//!         CardInput::basic(1, "2+2", "4"),
//!         CardInput::cloze(1, "The sky is {{c1::blue}}."),
//!     ],
//! );
//!
//! let archive = Exporter::with_defaults().generate(&request).unwrap();
//! std::fs::write(std::env::temp_dir().join("deck.apkg"), archive).unwrap();
//! ```
//!
//! # Loading configuration
//!
//! ```no_run
//! use deckpack_apkg::{ExportConfig, Exporter};
//!
//! let config = ExportConfig::load("export.yaml").unwrap();
//! let exporter = Exporter::new(config).unwrap();
//! ```

mod config;
mod convert;
mod engine;
mod error;
mod export;
mod ids;
mod package;
mod schema;

pub use config::ExportConfig;
pub use convert::{
    BuiltRows, CardDefaults, CardRow, FIELD_SEPARATOR, FRESH_CARD, NoteRow, build_rows,
    format_tags, insert_card, insert_note, note_fields,
};
pub use engine::{CollectionDb, CollectionStatus};
pub use error::{ExportError, Result};
pub use export::{ExportReport, Exporter, generate_package};
pub use ids::{IdAllocator, MAX_SEED_MS, compute_csum, new_guid};
pub use package::{COLLECTION_ENTRY, MEDIA_ENTRY, PackageWriter};
pub use schema::{BuiltSchema, ModelIds, SchemaTemplate};
