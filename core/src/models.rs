//! JSON records seeded into the collection row.
//!
//! The legacy collection format keeps its configuration, note types
//! ("models"), decks, and per-deck options as JSON text columns of the single
//! `col` row. Each record here serializes to exactly the object shape the
//! target application reads, with camelCase keys where the application uses
//! them.
//!
//! Maps are keyed by numeric id. [`BTreeMap`] keeps keys in ascending order
//! and `serde_json` renders integer keys as JSON strings, matching how the
//! application writes them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Deck, NoteKind};

/// Default Basic question template.
pub const DEFAULT_QUESTION_FORMAT: &str = "{{Front}}";

/// Default Basic answer template.
pub const DEFAULT_ANSWER_FORMAT: &str = "{{FrontSide}}\n\n<hr id=\"answer\">\n\n{{Back}}";

/// Default card stylesheet shared by both note types.
pub const DEFAULT_CSS: &str = ".card {
    font-family: arial;
    font-size: 20px;
    text-align: center;
    color: black;
    background-color: white;
  }";

/// LaTeX preamble shared by both note types.
pub const LATEX_PRE: &str = "\\documentclass[12pt]{article}
\\special{papersize=3in,5in}
\\usepackage[utf8]{inputenc}
\\usepackage{amssymb,amsmath}
\\pagestyle{empty}
\\setlength{\\parindent}{0in}
\\begin{document}
";

/// LaTeX postamble shared by both note types.
pub const LATEX_POST: &str = "\\end{document}";

/// Deck map as stored in `col.decks`.
pub type DeckMap = BTreeMap<i64, DeckRecord>;

/// Per-deck options map as stored in `col.dconf`.
pub type DeckConfigMap = BTreeMap<i64, DeckConfigRecord>;

/// Note type map as stored in `col.models`.
pub type NoteTypeMap = BTreeMap<i64, NoteTypeRecord>;

/// Customizable rendering for the Basic note type.
///
/// # Examples
///
/// ```
/// use deckpack_core::CardTemplateOptions;
///
/// let options = CardTemplateOptions::default();
/// assert_eq!(options.question_format, "{{Front}}");
/// assert!(options.answer_format.contains("{{Back}}"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTemplateOptions {
    /// Question side template of the Basic note type.
    pub question_format: String,
    /// Answer side template of the Basic note type.
    pub answer_format: String,
    /// Stylesheet shared by both note types.
    pub css: String,
}

impl Default for CardTemplateOptions {
    fn default() -> Self {
        Self {
            question_format: DEFAULT_QUESTION_FORMAT.to_string(),
            answer_format: DEFAULT_ANSWER_FORMAT.to_string(),
            css: DEFAULT_CSS.to_string(),
        }
    }
}

/// A deck entry of `col.decks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub id: i64,
    pub name: String,
    pub usn: i64,
    pub collapsed: bool,
    pub new_today: [i64; 2],
    pub rev_today: [i64; 2],
    pub lrn_today: [i64; 2],
    pub time_today: [i64; 2],
    #[serde(rename = "dyn")]
    pub dynamic: i64,
    pub extend_new: i64,
    pub extend_rev: i64,
    pub conf: i64,
}

impl DeckRecord {
    /// Creates a regular (non-filtered) deck using options group 1.
    pub fn new(deck: &Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name.clone(),
            usn: 0,
            collapsed: false,
            new_today: [0, 0],
            rev_today: [0, 0],
            lrn_today: [0, 0],
            time_today: [0, 0],
            dynamic: 0,
            extend_new: 10,
            extend_rev: 50,
            conf: 1,
        }
    }
}

/// Lapse settings of a deck options group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapseConfig {
    pub leech_fails: i64,
    pub min_int: i64,
    pub delays: Vec<i64>,
    pub leech_action: i64,
    pub mult: i64,
}

/// Review settings of a deck options group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewConfig {
    pub per_day: i64,
    pub fuzz: f64,
    pub ivl_fct: i64,
    pub max_ivl: i64,
    pub ease4: f64,
    pub bury: bool,
    pub min_space: i64,
}

/// New-card settings of a deck options group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCardConfig {
    pub per_day: i64,
    pub delays: Vec<i64>,
    pub separate: bool,
    pub ints: Vec<i64>,
    pub initial_factor: i64,
    pub bury: bool,
    pub order: i64,
}

/// A deck options entry of `col.dconf`.
///
/// Every deck gets its own entry with fixed scheduling defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfigRecord {
    pub name: String,
    pub replayq: bool,
    pub lapse: LapseConfig,
    pub rev: ReviewConfig,
    pub new: NewCardConfig,
    pub max_taken: i64,
    pub usn: i64,
    pub timer: i64,
    pub id: i64,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub autoplay: bool,
}

impl DeckConfigRecord {
    /// Creates the default options for `deck`, stamped with `modified` (seconds).
    pub fn defaults(deck: &Deck, modified: i64) -> Self {
        Self {
            name: deck.name.clone(),
            replayq: true,
            lapse: LapseConfig {
                leech_fails: 8,
                min_int: 1,
                delays: vec![10],
                leech_action: 0,
                mult: 0,
            },
            rev: ReviewConfig {
                per_day: 100,
                fuzz: 0.05,
                ivl_fct: 1,
                max_ivl: 36500,
                ease4: 1.3,
                bury: true,
                min_space: 1,
            },
            new: NewCardConfig {
                per_day: 20,
                delays: vec![1, 10],
                separate: true,
                ints: vec![1, 4, 7],
                initial_factor: 2500,
                bury: true,
                order: 1,
            },
            max_taken: 60,
            usn: 0,
            timer: 0,
            id: deck.id,
            modified,
            autoplay: true,
        }
    }
}

/// The collection-wide configuration stored in `col.conf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    pub next_pos: i64,
    pub est_times: bool,
    pub active_decks: Vec<i64>,
    pub sort_type: String,
    pub time_lim: i64,
    pub sort_backwards: bool,
    pub add_to_cur: bool,
    pub cur_deck: Option<i64>,
    pub new_bury: bool,
    pub new_spread: i64,
    pub due_counts: bool,
    pub cur_model: i64,
    pub collapse_time: i64,
}

impl CollectionConfig {
    /// Creates the configuration with every deck active (ascending id
    /// order), the first deck current, and `cur_model` as the current note
    /// type.
    pub fn new(decks: &[Deck], cur_model: i64) -> Self {
        let mut active_decks: Vec<i64> = decks.iter().map(|d| d.id).collect();
        active_decks.sort_unstable();
        active_decks.dedup();

        Self {
            next_pos: 1,
            est_times: true,
            active_decks,
            sort_type: "noteFld".to_string(),
            time_lim: 0,
            sort_backwards: false,
            add_to_cur: true,
            cur_deck: decks.first().map(|d| d.id),
            new_bury: true,
            new_spread: 0,
            due_counts: true,
            cur_model,
            collapse_time: 1200,
        }
    }
}

/// A field definition of a note type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub media: Vec<String>,
    pub sticky: bool,
    pub rtl: bool,
    pub ord: i64,
    pub font: String,
    pub size: i64,
}

impl FieldDef {
    fn new(name: &str, ord: i64) -> Self {
        Self {
            name: name.to_string(),
            media: Vec::new(),
            sticky: false,
            rtl: false,
            ord,
            font: "Arial".to_string(),
            size: 20,
        }
    }
}

/// A card template of a note type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    pub ord: i64,
    pub qfmt: String,
    pub bafmt: String,
    pub afmt: String,
    pub bqfmt: String,
    pub did: Option<i64>,
    pub sortf: i64,
}

impl TemplateDef {
    fn new(name: &str, qfmt: &str, afmt: &str) -> Self {
        Self {
            name: name.to_string(),
            ord: 0,
            qfmt: qfmt.to_string(),
            bafmt: String::new(),
            afmt: afmt.to_string(),
            bqfmt: String::new(),
            did: None,
            sortf: 0,
        }
    }
}

/// Card-generation requirement: `[template ord, "all"|"any", [field ords]]`.
pub type TemplateRequirement = (i64, String, Vec<i64>);

/// A note type entry of `col.models`.
///
/// # Examples
///
/// ```
/// use deckpack_core::{CardTemplateOptions, NoteTypeRecord};
///
/// let options = CardTemplateOptions::default();
/// let basic = NoteTypeRecord::basic(1_700_000_000_000, Some(1), 1_700_000_000, &options);
/// assert_eq!(basic.field_names(), vec!["Front", "Back"]);
///
/// let cloze = NoteTypeRecord::cloze(1_700_000_000_001, Some(1), 1_700_000_000, &options);
/// assert_eq!(cloze.field_names(), vec!["Text"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteTypeRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub did: Option<i64>,
    pub usn: i64,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub vers: Vec<i64>,
    pub tags: Vec<String>,
    pub req: Vec<TemplateRequirement>,
    pub sortf: i64,
    pub flds: Vec<FieldDef>,
    pub tmpls: Vec<TemplateDef>,
    pub css: String,
    pub latex_pre: String,
    pub latex_post: String,
}

impl NoteTypeRecord {
    /// Creates the Basic (Front/Back) note type.
    pub fn basic(
        id: i64,
        home_deck: Option<i64>,
        modified: i64,
        options: &CardTemplateOptions,
    ) -> Self {
        Self {
            id,
            name: "Basic".to_string(),
            kind: 0,
            did: home_deck,
            usn: -1,
            modified,
            vers: Vec::new(),
            tags: vec!["basic".to_string()],
            req: vec![(0, "all".to_string(), vec![0])],
            sortf: 0,
            flds: vec![FieldDef::new("Front", 0), FieldDef::new("Back", 1)],
            tmpls: vec![TemplateDef::new(
                "Card 1",
                &options.question_format,
                &options.answer_format,
            )],
            css: options.css.clone(),
            latex_pre: LATEX_PRE.to_string(),
            latex_post: LATEX_POST.to_string(),
        }
    }

    /// Creates the Cloze note type. Its templates are fixed; only the CSS
    /// is taken from `options`.
    pub fn cloze(
        id: i64,
        home_deck: Option<i64>,
        modified: i64,
        options: &CardTemplateOptions,
    ) -> Self {
        Self {
            id,
            name: "Cloze".to_string(),
            kind: 1,
            did: home_deck,
            usn: -1,
            modified,
            vers: Vec::new(),
            tags: vec!["cloze".to_string()],
            req: vec![(2, "all".to_string(), vec![0])],
            sortf: 0,
            flds: vec![FieldDef::new("Text", 0)],
            tmpls: vec![TemplateDef::new("Cloze", "{{cloze:Text}}", "{{cloze:Text}}")],
            css: options.css.clone(),
            latex_pre: LATEX_PRE.to_string(),
            latex_post: LATEX_POST.to_string(),
        }
    }

    /// Creates the record for `kind`.
    pub fn for_kind(
        kind: NoteKind,
        id: i64,
        home_deck: Option<i64>,
        modified: i64,
        options: &CardTemplateOptions,
    ) -> Self {
        match kind {
            NoteKind::Basic => Self::basic(id, home_deck, modified, options),
            NoteKind::Cloze => Self::cloze(id, home_deck, modified, options),
        }
    }

    /// Returns field names in ordinal order.
    pub fn field_names(&self) -> Vec<&str> {
        self.flds.iter().map(|f| f.name.as_str()).collect()
    }
}
