//! End-to-end export example.
//!
//! Builds a request with two decks and a mix of Basic and Cloze cards,
//! exports it, and writes `deckpack_demo.apkg` to the system temp directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p deckpack-demos --example export_deck
//! ```

use deckpack_apkg::{ExportConfig, Exporter};
use deckpack_core::{CardInput, Deck, ExportRequest, validate_request};

fn main() {
    // === Step 1: Assemble the request ===
    let decks = vec![
        Deck::new(1_700_000_000_001, "Arithmetic"),
        Deck::new(1_700_000_000_002, "Geography"),
    ];
    let cards = vec![
        CardInput::basic(decks[0].id, "2+2", "4").with_tag("easy"),
        CardInput::basic(decks[0].id, "7*6", "42"),
        CardInput::cloze(decks[1].id, "{{c1::Paris}} is the capital of France."),
        CardInput::cloze(decks[1].id, "The Nile flows into the {{c1::Mediterranean}}.")
            .with_tag("rivers"),
    ];
    let request = ExportRequest::new(decks, cards);

    let errors = validate_request(&request);
    println!("Validation errors: {}", errors.len());

    // === Step 2: Export ===
    let config = ExportConfig {
        media_manifest: true,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(config).unwrap();
    let (archive, report) = exporter.generate_at(&request, 1_700_000_000_000).unwrap();

    println!("Export report:");
    println!("  Basic model id: {}", report.model_ids.basic);
    println!("  Cloze model id: {}", report.model_ids.cloze);
    println!("  Notes inserted: {}", report.notes_inserted);
    println!("  Cards inserted: {}", report.cards_inserted);
    println!("  Database bytes: {}", report.database_bytes);
    println!("  Archive bytes:  {}", archive.len());

    // === Step 3: Write the package ===
    let path = std::env::temp_dir().join("deckpack_demo.apkg");
    std::fs::write(&path, &archive).unwrap();
    println!("\nWrote {}", path.display());
}
