//! Collection schema template and seed-script generation.
//!
//! The schema text creates the legacy collection tables and inserts the
//! single `col` row. Four JSON columns of that row are left as placeholders:
//!
//! - `{{conf}}`: collection configuration ([`CollectionConfig`])
//! - `{{models}}`: note type map ([`NoteTypeMap`])
//! - `{{decks}}`: deck map ([`DeckMap`])
//! - `{{dconf}}`: per-deck options map ([`DeckConfigMap`])
//!
//! [`SchemaTemplate::build`] fills them in for one export. Each placeholder
//! sits inside a single-quoted SQL literal, so substituted JSON has its
//! single quotes doubled.
//!
//! The bundled text is embedded at compile time and shared read-only by all
//! exports; [`SchemaTemplate::load`] reads an alternative from disk.

use std::path::Path;

use deckpack_core::{
    CardTemplateOptions, CollectionConfig, Deck, DeckConfigMap, DeckConfigRecord, DeckMap,
    DeckRecord, NoteKind, NoteTypeMap, NoteTypeRecord,
};
use serde::Serialize;

use crate::error::{ExportError, Result};

/// Schema text shipped with the crate.
const BUNDLED_SCHEMA: &str = include_str!("../assets/collection.sql");

const CONF_PLACEHOLDER: &str = "{{conf}}";
const MODELS_PLACEHOLDER: &str = "{{models}}";
const DECKS_PLACEHOLDER: &str = "{{decks}}";
const DCONF_PLACEHOLDER: &str = "{{dconf}}";

const PLACEHOLDERS: [&str; 4] = [
    CONF_PLACEHOLDER,
    MODELS_PLACEHOLDER,
    DECKS_PLACEHOLDER,
    DCONF_PLACEHOLDER,
];

/// Checks that every placeholder occurs exactly once in `text`.
pub(crate) fn validate_placeholders(text: &str) -> Result<()> {
    for placeholder in PLACEHOLDERS {
        match text.matches(placeholder).count() {
            1 => {}
            0 => {
                return Err(ExportError::TemplateMalformed(format!(
                    "placeholder {placeholder} not found"
                )));
            }
            n => {
                return Err(ExportError::TemplateMalformed(format!(
                    "placeholder {placeholder} occurs {n} times"
                )));
            }
        }
    }
    Ok(())
}

/// Note type ids of one export.
///
/// Both note types exist in every export; rows pick one by [`NoteKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelIds {
    /// Id of the Basic note type.
    pub basic: i64,
    /// Id of the Cloze note type.
    pub cloze: i64,
}

impl ModelIds {
    /// Derives both ids from the export timestamp: Basic is `t`, Cloze `t + 1`.
    pub fn from_timestamp(timestamp_ms: i64) -> Self {
        Self {
            basic: timestamp_ms,
            cloze: timestamp_ms + 1,
        }
    }

    /// Returns the id for `kind`.
    pub fn get(&self, kind: NoteKind) -> i64 {
        match kind {
            NoteKind::Basic => self.basic,
            NoteKind::Cloze => self.cloze,
        }
    }
}

/// Output of [`SchemaTemplate::build`].
#[derive(Debug, Clone)]
pub struct BuiltSchema {
    /// Executable schema and seed script.
    pub script: String,
    /// Note type ids referenced by the seeded `models` map.
    pub model_ids: ModelIds,
}

/// The schema/seed text with its four substitution points.
///
/// # Examples
///
/// ```
/// use deckpack_apkg::SchemaTemplate;
/// use deckpack_core::{CardTemplateOptions, Deck, NoteKind};
///
/// let template = SchemaTemplate::bundled();
/// let built = template
///     .build(
///         NoteKind::Basic,
///         &[Deck::new(1, "Deck A")],
///         &CardTemplateOptions::default(),
///         1_700_000_000_000,
///     )
///     .unwrap();
/// assert_eq!(built.model_ids.cloze, built.model_ids.basic + 1);
/// assert!(built.script.contains("Deck A"));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaTemplate {
    text: String,
}

impl SchemaTemplate {
    /// Returns the schema text shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            text: BUNDLED_SCHEMA.to_string(),
        }
    }

    /// Reads schema text from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::AssetMissing`] if the file cannot be read, or
    /// [`ExportError::TemplateMalformed`] if a placeholder is missing or
    /// repeated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ExportError::AssetMissing {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(text)
    }

    /// Wraps schema text after checking its placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::TemplateMalformed`] if a placeholder is missing
    /// or repeated.
    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        validate_placeholders(&text)?;
        Ok(Self { text })
    }

    /// Returns the unfilled template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Builds the seed script for one export.
    ///
    /// `active` becomes the collection's current note type. The first deck
    /// becomes the current deck and the home deck of both note types.
    /// `timestamp_ms` is the export start time; it fixes the note type ids and
    /// the records' modification time.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::TemplateMalformed`] if a placeholder is missing
    /// or repeated, or [`ExportError::Serialization`] if a record fails to
    /// serialize.
    pub fn build(
        &self,
        active: NoteKind,
        decks: &[Deck],
        options: &CardTemplateOptions,
        timestamp_ms: i64,
    ) -> Result<BuiltSchema> {
        validate_placeholders(&self.text)?;

        let modified = timestamp_ms / 1000;
        let model_ids = ModelIds::from_timestamp(timestamp_ms);
        let home_deck = decks.first().map(|d| d.id);

        let deck_map: DeckMap = decks.iter().map(|d| (d.id, DeckRecord::new(d))).collect();
        let dconf_map: DeckConfigMap = decks
            .iter()
            .map(|d| (d.id, DeckConfigRecord::defaults(d, modified)))
            .collect();
        let conf = CollectionConfig::new(decks, model_ids.get(active));

        let mut models = NoteTypeMap::new();
        for kind in [NoteKind::Basic, NoteKind::Cloze] {
            let id = model_ids.get(kind);
            models.insert(
                id,
                NoteTypeRecord::for_kind(kind, id, home_deck, modified, options),
            );
        }

        let script = self.substitute([
            (CONF_PLACEHOLDER, sql_json(&conf)?),
            (MODELS_PLACEHOLDER, sql_json(&models)?),
            (DECKS_PLACEHOLDER, sql_json(&deck_map)?),
            (DCONF_PLACEHOLDER, sql_json(&dconf_map)?),
        ])?;

        Ok(BuiltSchema { script, model_ids })
    }

    /// Replaces each placeholder in a single pass over the template, so
    /// placeholder-like text inside substituted values is left alone.
    fn substitute(&self, values: [(&str, String); 4]) -> Result<String> {
        let mut spans = Vec::with_capacity(values.len());
        for (placeholder, value) in values {
            let pos = self.text.find(placeholder).ok_or_else(|| {
                ExportError::TemplateMalformed(format!("placeholder {placeholder} not found"))
            })?;
            spans.push((pos, placeholder.len(), value));
        }
        spans.sort_by_key(|(pos, _, _)| *pos);

        let extra: usize = spans.iter().map(|(_, _, value)| value.len()).sum();
        let mut script = String::with_capacity(self.text.len() + extra);
        let mut cursor = 0;
        for (pos, len, value) in spans {
            script.push_str(&self.text[cursor..pos]);
            script.push_str(&value);
            cursor = pos + len;
        }
        script.push_str(&self.text[cursor..]);
        Ok(script)
    }
}

/// Serializes `value` to JSON escaped for a single-quoted SQL literal.
fn sql_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('\'', "''"))
}
