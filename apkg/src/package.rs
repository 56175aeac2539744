//! Archive container for the serialized collection.
//!
//! The package is a zip archive whose primary entry, `collection.anki2`,
//! holds the SQLite image. Entries are stored uncompressed. An empty `media`
//! manifest can be added on request for importers that insist on one.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Entry name of the collection database inside the package.
pub const COLLECTION_ENTRY: &str = "collection.anki2";

/// Entry name of the media manifest.
pub const MEDIA_ENTRY: &str = "media";

/// Writes collection images into package archives.
///
/// # Examples
///
/// ```
/// use deckpack_apkg::PackageWriter;
///
/// let archive = PackageWriter::new().pack(b"not really sqlite").unwrap();
/// assert!(archive.starts_with(b"PK"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageWriter {
    media_manifest: bool,
}

impl PackageWriter {
    /// Creates a writer producing a single-entry archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also writes an empty `media` manifest entry (builder pattern).
    pub fn with_media_manifest(mut self, enabled: bool) -> Self {
        self.media_manifest = enabled;
        self
    }

    /// Wraps `database` in a package archive and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::PackagingFailure`](crate::ExportError::PackagingFailure)
    /// if the archive cannot be finalized.
    pub fn pack(&self, database: &[u8]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file(COLLECTION_ENTRY, options)?;
        zip.write_all(database).map_err(zip::result::ZipError::Io)?;

        if self.media_manifest {
            zip.start_file(MEDIA_ENTRY, options)?;
            zip.write_all(b"{}").map_err(zip::result::ZipError::Io)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
