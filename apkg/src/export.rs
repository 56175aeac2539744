//! Export orchestration.
//!
//! [`Exporter::generate`] runs one export end to end:
//!
//! 1. validate the request
//! 2. build the seed script from the schema template
//! 3. run it against a fresh in-memory database
//! 4. build and insert the note and card row of every card, in input order
//! 5. export the database image and wrap it in the package archive
//!
//! Any failure aborts the export; no partial archive is returned. Each call
//! owns its database and [`IdAllocator`], so separate calls may run
//! concurrently on one `Exporter`.

use chrono::Utc;
use deckpack_core::{CardInput, Deck, ExportRequest, ValidationError, validate_request};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::convert::{build_rows, insert_card, insert_note};
use crate::engine::CollectionDb;
use crate::error::Result;
use crate::ids::IdAllocator;
use crate::schema::{ModelIds, SchemaTemplate};

/// Builds package archives from export requests.
///
/// # Examples
///
/// ```
/// use deckpack_apkg::Exporter;
/// use deckpack_core::{CardInput, Deck, ExportRequest};
///
/// let exporter = Exporter::with_defaults();
/// let request = ExportRequest::new(
///     vec![Deck::new(1, "Deck A")],
///     vec![CardInput::basic(1, "2+2", "4")],
/// );
/// let archive = exporter.generate(&request).unwrap();
/// assert!(archive.starts_with(b"PK"));
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    template: SchemaTemplate,
    config: ExportConfig,
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Timestamp (ms) the export was stamped with.
    pub started_at_ms: i64,
    /// Note type ids written to the collection.
    pub model_ids: ModelIds,
    /// Notes inserted.
    pub notes_inserted: usize,
    /// Cards inserted.
    pub cards_inserted: usize,
    /// Size of the database image in bytes.
    pub database_bytes: usize,
}

impl Exporter {
    /// Creates an exporter, resolving the schema template once.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::AssetMissing`](crate::ExportError::AssetMissing)
    /// or [`ExportError::TemplateMalformed`](crate::ExportError::TemplateMalformed)
    /// if the configured schema file is unusable.
    pub fn new(config: ExportConfig) -> Result<Self> {
        let template = config.schema_template()?;
        Ok(Self { template, config })
    }

    /// Creates an exporter with the bundled schema and default templates.
    pub fn with_defaults() -> Self {
        Self {
            template: SchemaTemplate::bundled(),
            config: ExportConfig::default(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports `request`, stamped with the current time.
    pub fn generate(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        self.generate_at(request, Utc::now().timestamp_millis())
            .map(|(archive, _)| archive)
    }

    /// Exports `request` using `started_at_ms` as the export timestamp.
    ///
    /// The timestamp seeds the note type ids, the id allocator, and every
    /// row's modification time, so equal inputs and timestamps yield equal
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidTimestamp`](crate::ExportError::InvalidTimestamp)
    /// unless `1 <= started_at_ms <= MAX_SEED_MS`, before any database work.
    pub fn generate_at(
        &self,
        request: &ExportRequest,
        started_at_ms: i64,
    ) -> Result<(Vec<u8>, ExportReport)> {
        let errors = validate_request(request);
        let first = errors
            .iter()
            .find(|e| matches!(e, ValidationError::UnknownNoteType(_)))
            .or(errors.first());
        if let Some(err) = first {
            return Err(err.clone().into());
        }

        let mut ids = IdAllocator::new(started_at_ms)?;

        let active = request.active_note_kind();
        debug!(
            decks = request.decks.len(),
            cards = request.cards.len(),
            active = %active,
            "building collection schema"
        );
        let built = self.template.build(
            active,
            &request.decks,
            &self.config.templates,
            started_at_ms,
        )?;

        let mut db = CollectionDb::open_in_memory()?;
        db.execute_script(&built.script)?;

        let modified = started_at_ms / 1000;
        let mut notes_inserted = 0;
        let mut cards_inserted = 0;

        let tx = db.transaction()?;
        for (index, card) in request.cards.iter().enumerate() {
            let rows = build_rows(index, card, &built.model_ids, modified, &mut ids)?;
            insert_note(&tx, &rows.note)?;
            notes_inserted += 1;
            insert_card(&tx, &rows.card)?;
            cards_inserted += 1;
        }
        tx.commit()?;
        debug!(notes = notes_inserted, cards = cards_inserted, "rows inserted");

        let image = db.export_image()?;
        let archive = self.config.package_writer().pack(&image)?;

        info!(
            notes = notes_inserted,
            cards = cards_inserted,
            database_bytes = image.len(),
            archive_bytes = archive.len(),
            "package exported"
        );

        let report = ExportReport {
            started_at_ms,
            model_ids: built.model_ids,
            notes_inserted,
            cards_inserted,
            database_bytes: image.len(),
        };
        Ok((archive, report))
    }
}

/// Exports `decks` and `cards` with the default configuration.
///
/// # Errors
///
/// Propagates every [`ExportError`](crate::ExportError) of
/// [`Exporter::generate`].
pub fn generate_package(decks: Vec<Deck>, cards: Vec<CardInput>) -> Result<Vec<u8>> {
    Exporter::with_defaults().generate(&ExportRequest::new(decks, cards))
}
