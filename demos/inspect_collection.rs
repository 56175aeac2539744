//! Opens an exported package and prints what the importer will see.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p deckpack-demos --example inspect_collection
//! ```

use std::io::{Cursor, Read};

use deckpack_apkg::{COLLECTION_ENTRY, generate_package};
use deckpack_core::{CardInput, Deck};
use rusqlite::Connection;
use zip::ZipArchive;

fn main() {
    let archive = generate_package(
        vec![Deck::new(1, "Deck A")],
        vec![
            CardInput::basic(1, "2+2", "4"),
            CardInput::cloze(1, "The sky is {{c1::blue}}."),
        ],
    )
    .unwrap();

    // === Unpack ===
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    println!("Entries:");
    for name in zip.file_names() {
        println!("  {name}");
    }

    let mut image = Vec::new();
    zip.by_name(COLLECTION_ENTRY)
        .unwrap()
        .read_to_end(&mut image)
        .unwrap();

    let path = std::env::temp_dir().join("deckpack_inspect.anki2");
    std::fs::write(&path, image).unwrap();
    let conn = Connection::open(&path).unwrap();

    print_notes(&conn);
    print_cards(&conn);

    drop(conn);
    let _ = std::fs::remove_file(&path);
}

fn print_notes(conn: &Connection) {
    println!("\nNotes:");
    let mut stmt = conn
        .prepare("SELECT id, mid, sfld, csum, flds FROM notes ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .unwrap();
    for row in rows {
        let (id, mid, sfld, csum, flds) = row.unwrap();
        let fields: Vec<&str> = flds.split('\u{1f}').collect();
        println!("  {id} model={mid} sort={sfld:?} csum={csum} fields={fields:?}");
    }
}

fn print_cards(conn: &Connection) {
    println!("\nCards:");
    let mut stmt = conn
        .prepare("SELECT id, nid, did, type, queue, due FROM cards ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .unwrap();
    for row in rows {
        let (id, nid, did, card_type, queue, due) = row.unwrap();
        println!("  {id} note={nid} deck={did} type={card_type} queue={queue} due={due}");
    }
}
