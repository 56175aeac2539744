//! Embedded database driver for one export.
//!
//! [`CollectionDb`] owns an in-memory SQLite connection and is driven in a
//! fixed order: run the schema/seed script once, insert rows, then export the
//! database image. Nothing is read back during an export; row counts are
//! available through [`CollectionDb::status`] for diagnostics and tests.
//!
//! # Example
//!
//! ```
//! use deckpack_apkg::{CollectionDb, SchemaTemplate};
//! use deckpack_core::{CardTemplateOptions, Deck, NoteKind};
//!
//! let built = SchemaTemplate::bundled()
//!     .build(
//!         NoteKind::Basic,
//!         &[Deck::new(1, "A")],
//!         &CardTemplateOptions::default(),
//!         1_700_000_000_000,
//!     )
//!     .unwrap();
//!
//! let mut db = CollectionDb::open_in_memory().unwrap();
//! db.execute_script(&built.script).unwrap();
//! let image = db.export_image().unwrap();
//! assert!(image.starts_with(b"SQLite format 3\0"));
//! ```

use rusqlite::{Connection, MAIN_DB, Transaction};

use crate::error::Result;

/// An in-memory collection database.
pub struct CollectionDb {
    conn: Connection,
}

impl CollectionDb {
    /// Opens an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Executes a multi-statement script (the schema and seed rows).
    pub fn execute_script(&mut self, script: &str) -> Result<()> {
        self.conn.execute_batch(script)?;
        Ok(())
    }

    /// Starts a transaction for row insertion.
    ///
    /// Rows inserted through the returned transaction are visible to
    /// [`export_image`](Self::export_image) only after it is committed.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Serializes the full database into a standalone SQLite file image.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EngineFailure`](crate::ExportError::EngineFailure)
    /// if SQLite cannot serialize the main database.
    pub fn export_image(&self) -> Result<Vec<u8>> {
        let image = self.conn.serialize(MAIN_DB)?;
        Ok(image.to_vec())
    }

    /// Returns row counts of the collection tables.
    pub fn status(&self) -> Result<CollectionStatus> {
        Ok(CollectionStatus {
            tables_exist: self.tables_exist()?,
            note_count: self.count_rows("notes")?,
            card_count: self.count_rows("cards")?,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the database and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn tables_exist(&self) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type='table' AND name IN ('col', 'notes', 'cards')",
        )?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count == 3)
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        if !self.tables_exist()? {
            return Ok(0);
        }
        let mut stmt = self.conn.prepare(&format!("SELECT COUNT(*) FROM {table}"))?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Snapshot of a collection database's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStatus {
    /// Whether `col`, `notes`, and `cards` exist.
    pub tables_exist: bool,
    /// Rows in `notes`.
    pub note_count: usize,
    /// Rows in `cards`.
    pub card_count: usize,
}
