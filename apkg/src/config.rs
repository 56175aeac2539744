//! Export configuration.
//!
//! Controls how the Basic note type renders, where the schema template comes
//! from, and whether the package carries a media manifest. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! templates:
//!   question_format: "{{Front}}"
//!   answer_format: "{{FrontSide}}<hr id=answer>{{Back}}"
//!   css: ".card { font-family: arial; }"
//! schema_path: null
//! media_manifest: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use deckpack_core::CardTemplateOptions;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::package::PackageWriter;
use crate::schema::SchemaTemplate;

/// Settings for an [`Exporter`](crate::Exporter).
///
/// # Examples
///
/// ```
/// use deckpack_apkg::ExportConfig;
///
/// let config = ExportConfig::default();
/// assert!(config.schema_path.is_none());
/// assert!(!config.media_manifest);
/// assert_eq!(config.templates.question_format, "{{Front}}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Basic note type templates and shared CSS.
    pub templates: CardTemplateOptions,
    /// Schema template file to use instead of the bundled one.
    pub schema_path: Option<PathBuf>,
    /// Add an empty `media` manifest entry to the package.
    pub media_manifest: bool,
}

impl ExportConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| ExportError::Config(format!("failed to open '{}': {e}", path.display())))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader)
            .map_err(|e| ExportError::Config(format!("failed to parse '{}': {e}", path.display())))
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| {
            ExportError::Config(format!("failed to create '{}': {e}", path.display()))
        })?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ExportError::Config(format!("failed to write '{}': {e}", path.display())))
    }

    /// Resolves the schema template: the configured file, or the bundled text.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::AssetMissing`] if `schema_path` cannot be read.
    pub fn schema_template(&self) -> Result<SchemaTemplate> {
        match &self.schema_path {
            Some(path) => SchemaTemplate::load(path),
            None => Ok(SchemaTemplate::bundled()),
        }
    }

    /// Returns the package writer for this configuration.
    pub fn package_writer(&self) -> PackageWriter {
        PackageWriter::new().with_media_manifest(self.media_manifest)
    }
}
