//! Integration tests for the deckpack-apkg crate.
//!
//! Each test exports a package, unpacks it with `zip`, reopens the collection
//! image with `rusqlite`, and inspects the rows.

use std::io::{Cursor, Read};

use deckpack_apkg::{
    COLLECTION_ENTRY, ExportConfig, ExportError, Exporter, MEDIA_ENTRY, compute_csum,
};
use deckpack_core::{CardInput, Deck, ExportRequest, ValidationError};
use rusqlite::Connection;
use tempfile::TempDir;
use zip::ZipArchive;

const T: i64 = 1_700_000_000_000;

/// Unpacked collection kept alive together with its scratch directory.
struct Unpacked {
    _dir: TempDir,
    conn: Connection,
    entry_names: Vec<String>,
}

fn unpack(archive: Vec<u8>) -> Unpacked {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let entry_names: Vec<String> = zip.file_names().map(String::from).collect();

    let mut image = Vec::new();
    zip.by_name(COLLECTION_ENTRY)
        .unwrap()
        .read_to_end(&mut image)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(COLLECTION_ENTRY);
    std::fs::write(&path, image).unwrap();
    let conn = Connection::open(&path).unwrap();

    Unpacked {
        _dir: dir,
        conn,
        entry_names,
    }
}

fn export(request: &ExportRequest) -> Unpacked {
    let (archive, _) = Exporter::with_defaults().generate_at(request, T).unwrap();
    unpack(archive)
}

fn deck_a() -> Vec<Deck> {
    vec![Deck::new(1, "Deck A")]
}

fn col_json(conn: &Connection, column: &str) -> serde_json::Value {
    let text: String = conn
        .query_row(&format!("SELECT {column} FROM col"), [], |r| r.get(0))
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

fn ids(conn: &Connection, sql: &str) -> Vec<i64> {
    let mut stmt = conn.prepare(sql).unwrap();
    stmt.query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_basic_card_scenario() {
    let request = ExportRequest::new(deck_a(), vec![CardInput::basic(1, "2+2", "4")]);
    let out = export(&request);

    assert_eq!(out.entry_names, vec![COLLECTION_ENTRY.to_string()]);

    let (flds, sfld, mid, csum): (String, String, i64, i64) = out
        .conn
        .query_row("SELECT flds, sfld, mid, csum FROM notes", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })
        .unwrap();
    assert_eq!(flds, "2+2\u{1f}4");
    assert_eq!(sfld, "2+2");
    assert_eq!(mid, T);
    assert_eq!(csum, compute_csum("2+2"));

    let (did, card_type, queue, due): (i64, i64, i64, i64) = out
        .conn
        .query_row("SELECT did, type, queue, due FROM cards", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })
        .unwrap();
    assert_eq!(did, 1);
    assert_eq!(card_type, 0);
    assert_eq!(queue, 0);
    assert_eq!(due, 0);
}

#[test]
fn test_cloze_card_scenario() {
    let text = "The sky is {{c1::blue}}.";
    let request = ExportRequest::new(deck_a(), vec![CardInput::cloze(1, text)]);
    let out = export(&request);

    let (flds, sfld, mid): (String, String, i64) = out
        .conn
        .query_row("SELECT flds, sfld, mid FROM notes", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?))
        })
        .unwrap();
    assert_eq!(flds, text);
    assert_eq!(sfld, text);
    assert_eq!(mid, T + 1);

    assert_eq!(col_json(&out.conn, "conf")["curModel"], T + 1);
}

#[test]
fn test_unsupported_note_type_returns_no_archive() {
    let card = CardInput {
        deck_id: 1,
        note_type: Some("unsupported".into()),
        front: Some("q".into()),
        back: Some("a".into()),
        ..CardInput::default()
    };
    let result = Exporter::with_defaults().generate(&ExportRequest::new(deck_a(), vec![card]));
    assert!(matches!(result, Err(ExportError::UnknownNoteType(_))));
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_ids_unique_and_increasing_in_input_order() {
    let cards: Vec<CardInput> = (0..50)
        .map(|i| {
            if i % 3 == 0 {
                CardInput::cloze(1, format!("{{{{c1::item {i}}}}}"))
            } else {
                CardInput::basic(1, format!("q{i}"), format!("a{i}"))
            }
        })
        .collect();
    let out = export(&ExportRequest::new(deck_a(), cards));

    let note_ids = ids(&out.conn, "SELECT id FROM notes ORDER BY rowid");
    let card_ids = ids(&out.conn, "SELECT id FROM cards ORDER BY rowid");
    assert_eq!(note_ids.len(), 50);
    assert_eq!(card_ids.len(), 50);
    assert!(note_ids.windows(2).all(|w| w[0] < w[1]));
    assert!(card_ids.windows(2).all(|w| w[0] < w[1]));

    // Input order is preserved: the first note is the first card's.
    let first_sfld: String = out
        .conn
        .query_row("SELECT sfld FROM notes WHERE id = ?1", [note_ids[0]], |r| r.get(0))
        .unwrap();
    assert_eq!(first_sfld, "{{c1::item 0}}");

    let max_note = *note_ids.last().unwrap();
    assert!(card_ids.iter().all(|&c| c > max_note));
}

#[test]
fn test_card_id_exceeds_its_note_id() {
    let cards = (0..10).map(|i| CardInput::basic(1, format!("q{i}"), "a")).collect();
    let out = export(&ExportRequest::new(deck_a(), cards));

    let violations: i64 = out
        .conn
        .query_row(
            "SELECT COUNT(*) FROM cards c JOIN notes n ON n.id = c.nid WHERE c.id <= n.id",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(violations, 0);
}

#[test]
fn test_referential_integrity() {
    let decks = vec![Deck::new(10, "Languages"), Deck::new(20, "Languages::French")];
    let cards = vec![
        CardInput::basic(10, "hello", "bonjour"),
        CardInput::basic(20, "cat", "chat"),
        CardInput::cloze(20, "{{c1::Paris}} is the capital"),
    ];
    let out = export(&ExportRequest::new(decks, cards));

    let deck_map = col_json(&out.conn, "decks");
    for did in ids(&out.conn, "SELECT did FROM cards") {
        assert!(deck_map.get(did.to_string()).is_some(), "deck {did} missing");
    }

    let models = col_json(&out.conn, "models");
    for mid in ids(&out.conn, "SELECT mid FROM notes") {
        assert!(models.get(mid.to_string()).is_some(), "model {mid} missing");
    }

    let orphans: i64 = out
        .conn
        .query_row(
            "SELECT COUNT(*) FROM cards WHERE nid NOT IN (SELECT id FROM notes)",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn test_row_counts_match_input() {
    let cards = (0..7).map(|i| CardInput::basic(1, format!("q{i}"), "a")).collect();
    let out = export(&ExportRequest::new(deck_a(), cards));

    let notes: i64 = out
        .conn
        .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
        .unwrap();
    let cards: i64 = out
        .conn
        .query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))
        .unwrap();
    assert_eq!(notes, 7);
    assert_eq!(cards, 7);
    assert_eq!(out.entry_names.len(), 1);
}

#[test]
fn test_both_models_present_for_basic_only_input() {
    let out = export(&ExportRequest::new(deck_a(), vec![CardInput::basic(1, "q", "a")]));
    let models = col_json(&out.conn, "models");
    assert_eq!(models[T.to_string()]["name"], "Basic");
    assert_eq!(models[(T + 1).to_string()]["name"], "Cloze");
}

#[test]
fn test_guids_unique_and_tags_written() {
    let cards = vec![
        CardInput::basic(1, "q1", "a").with_tag("math").with_tag("year one"),
        CardInput::basic(1, "q2", "a"),
    ];
    let out = export(&ExportRequest::new(deck_a(), cards));

    let mut stmt = out
        .conn
        .prepare("SELECT guid, tags FROM notes ORDER BY id")
        .unwrap();
    let rows: Vec<(String, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_ne!(rows[0].0, rows[1].0);
    assert_eq!(rows[0].1, " math year_one ");
    assert_eq!(rows[1].1, "");
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_media_manifest_option() {
    let config = ExportConfig {
        media_manifest: true,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(config).unwrap();
    let (archive, _) = exporter
        .generate_at(&ExportRequest::new(deck_a(), Vec::new()), T)
        .unwrap();
    let out = unpack(archive);
    assert!(out.entry_names.contains(&MEDIA_ENTRY.to_string()));
    assert!(out.entry_names.contains(&COLLECTION_ENTRY.to_string()));
}

#[test]
fn test_schema_file_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.sql");
    let exporter = Exporter::with_defaults();
    let bundled = deckpack_apkg::SchemaTemplate::bundled();
    std::fs::write(&path, bundled.text()).unwrap();

    let config = ExportConfig {
        schema_path: Some(path),
        ..exporter.config().clone()
    };
    let (archive, report) = Exporter::new(config)
        .unwrap()
        .generate_at(&ExportRequest::new(deck_a(), vec![CardInput::basic(1, "q", "a")]), T)
        .unwrap();
    assert_eq!(report.notes_inserted, 1);
    assert_eq!(unpack(archive).entry_names.len(), 1);
}

#[test]
fn test_malformed_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.sql");
    std::fs::write(&path, "CREATE TABLE col (id integer);").unwrap();

    let config = ExportConfig {
        schema_path: Some(path),
        ..ExportConfig::default()
    };
    assert!(matches!(
        Exporter::new(config),
        Err(ExportError::TemplateMalformed(_))
    ));
}

#[test]
fn test_missing_basic_field_is_rejected() {
    let card = CardInput {
        deck_id: 1,
        front: Some("q".into()),
        ..CardInput::default()
    };
    let result = Exporter::with_defaults().generate(&ExportRequest::new(deck_a(), vec![card]));
    assert!(matches!(
        result,
        Err(ExportError::InvalidInput(ValidationError::MissingField { field: "back", .. }))
    ));
}

#[test]
fn test_same_timestamp_same_ids() {
    let request = ExportRequest::new(deck_a(), vec![CardInput::basic(1, "q", "a")]);
    let a = export(&request);
    let b = export(&request);
    assert_eq!(
        ids(&a.conn, "SELECT id FROM notes"),
        ids(&b.conn, "SELECT id FROM notes")
    );
    assert_eq!(
        ids(&a.conn, "SELECT id FROM cards"),
        ids(&b.conn, "SELECT id FROM cards")
    );
}
