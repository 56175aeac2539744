use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::Command;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir()
            .join(format!("deckpack_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn write_request(dir: &TempDir, request: serde_json::Value) -> PathBuf {
    let path = dir.join("request.json");
    fs::write(&path, serde_json::to_string_pretty(&request).unwrap())
        .expect("failed to write request");
    path
}

fn sample_request() -> serde_json::Value {
    serde_json::json!({
        "decks": [{ "id": 1, "name": "Deck A" }],
        "cards": [
            { "deckId": 1, "front": "2+2", "back": "4" },
            { "deckId": 1, "noteType": "cloze", "text": "The sky is {{c1::blue}}." }
        ]
    })
}

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_deckpack")
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_writes_package() {
    let dir = TempDir::new("export_writes");
    let input = write_request(&dir, sample_request());
    let output = dir.join("out/deck.apkg");

    let out = Command::new(bin())
        .args(["export", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .output()
        .expect("failed to run deckpack");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Exported 2 card(s)"), "stdout: {stdout}");

    let bytes = fs::read(&output).expect("package not written");
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);

    let mut image = Vec::new();
    std::io::copy(&mut archive.by_name("collection.anki2").unwrap(), &mut image).unwrap();
    let db_path = dir.join("collection.anki2");
    fs::write(&db_path, image).unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let notes: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
        .unwrap();
    let cards: i64 = conn
        .query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))
        .unwrap();
    assert_eq!(notes, 2);
    assert_eq!(cards, 2);
}

#[test]
fn export_with_config_adds_media_manifest() {
    let dir = TempDir::new("export_config");
    let input = write_request(&dir, sample_request());
    let config = dir.join("export.yaml");
    fs::write(&config, "media_manifest: true\n").unwrap();
    let output = dir.join("deck.apkg");

    let status = Command::new(bin())
        .args(["export", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .status()
        .expect("failed to run deckpack");
    assert!(status.success());

    let archive = zip::ZipArchive::new(Cursor::new(fs::read(&output).unwrap())).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"media"));
    assert!(names.contains(&"collection.anki2"));
}

#[test]
fn export_unknown_note_type_fails_without_output() {
    let dir = TempDir::new("export_unknown_type");
    let input = write_request(
        &dir,
        serde_json::json!({
            "decks": [{ "id": 1, "name": "Deck A" }],
            "cards": [{ "deckId": 1, "noteType": "unsupported", "front": "q", "back": "a" }]
        }),
    );
    let output = dir.join("deck.apkg");

    let out = Command::new(bin())
        .args(["export", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .output()
        .expect("failed to run deckpack");
    assert!(!out.status.success());
    assert!(!output.exists());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown note type: unsupported"), "stderr: {stderr}");
}

#[test]
fn export_missing_input_fails() {
    let dir = TempDir::new("export_missing_input");
    let out = Command::new(bin())
        .args(["export", "--input"])
        .arg(dir.join("nope.json"))
        .arg("--output")
        .arg(dir.join("deck.apkg"))
        .output()
        .expect("failed to run deckpack");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error: Failed to read"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_good_request() {
    let dir = TempDir::new("validate_ok");
    let input = write_request(&dir, sample_request());

    let out = Command::new(bin())
        .args(["validate", "--input"])
        .arg(&input)
        .output()
        .expect("failed to run deckpack");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Request is valid: 1 deck(s), 2 card(s)."));
}

#[test]
fn validate_lists_every_problem() {
    let dir = TempDir::new("validate_bad");
    let input = write_request(
        &dir,
        serde_json::json!({
            "decks": [{ "id": 1, "name": "Deck A" }],
            "cards": [
                { "deckId": 9, "front": "q", "back": "a" },
                { "deckId": 1, "front": "q" }
            ]
        }),
    );

    let out = Command::new(bin())
        .args(["validate", "--input"])
        .arg(&input)
        .output()
        .expect("failed to run deckpack");
    assert_eq!(out.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("unknown deck 9"), "stdout: {stdout}");
    assert!(stdout.contains("'back'"), "stdout: {stdout}");
    assert!(String::from_utf8_lossy(&out.stderr).contains("2 validation error(s)"));
}
