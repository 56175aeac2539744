//! Error types for package export.
//!
//! Provides a unified error type covering every way an export can abort:
//! schema asset problems, invalid input, embedded database failures, and
//! archive packaging failures. No variant is recoverable mid-export; a failed
//! export produces no archive.

use std::path::PathBuf;

use deckpack_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while building a package.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The schema template text could not be read.
    #[error("schema asset missing at '{}': {source}", .path.display())]
    AssetMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A placeholder is missing from (or repeated in) the schema template.
    #[error("malformed schema template: {0}")]
    TemplateMalformed(String),

    /// A card declares a note type other than `basic` or `cloze`.
    #[error("unknown note type: {0}")]
    UnknownNoteType(String),

    /// The export timestamp cannot seed the id allocator.
    #[error("export timestamp {0} ms is outside the supported id range")]
    InvalidTimestamp(i64),

    /// The id allocator ran out of ids for this export.
    #[error("id space exhausted")]
    IdsExhausted,

    /// The request failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(ValidationError),

    /// The embedded database rejected the schema script or a row insert.
    #[error("database error: {0}")]
    EngineFailure(#[from] rusqlite::Error),

    /// The archive container could not be written.
    #[error("packaging error: {0}")]
    PackagingFailure(#[from] zip::result::ZipError),

    /// A collection record could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export configuration could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}

impl From<ValidationError> for ExportError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownNoteType(name) => ExportError::UnknownNoteType(name),
            other => ExportError::InvalidInput(other),
        }
    }
}

/// Convenience alias for results with [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;
