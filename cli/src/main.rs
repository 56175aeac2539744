use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use deckpack_apkg::{ExportConfig, Exporter};
use deckpack_core::{ExportRequest, validate_request};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "deckpack")]
#[command(about = "Export flashcard decks as importable .apkg packages")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a package from a JSON export request.
    Export(ExportArgs),
    /// Check a JSON export request without writing anything.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Request JSON with `decks` and `cards` arrays.
    #[arg(long)]
    input: PathBuf,
    /// Output package path (e.g. deck.apkg).
    #[arg(long)]
    output: PathBuf,
    /// Optional YAML export configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Request JSON with `decks` and `cards` arrays.
    #[arg(long)]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Export(args) => run_export(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            _ => EnvFilter::new("debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run_export(args: ExportArgs) -> Result<(), String> {
    let request = read_request(&args.input)?;

    let config = match &args.config {
        Some(path) => ExportConfig::load(path).map_err(|e| e.to_string())?,
        None => ExportConfig::default(),
    };
    let exporter = Exporter::new(config).map_err(|e| e.to_string())?;
    let archive = exporter
        .generate(&request)
        .map_err(|e| format!("Export failed: {e}"))?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(&args.output, &archive)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Exported {} card(s) in {} deck(s) to '{}' ({} bytes).",
        request.cards.len(),
        request.decks.len(),
        args.output.display(),
        archive.len()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let request = read_request(&args.input)?;
    let errors = validate_request(&request);

    if errors.is_empty() {
        println!(
            "Request is valid: {} deck(s), {} card(s).",
            request.decks.len(),
            request.cards.len()
        );
        return Ok(());
    }

    for err in &errors {
        println!("  {err}");
    }
    Err(format!("{} validation error(s) in '{}'", errors.len(), args.input.display()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reads and parses an export request file.
fn read_request(path: &Path) -> Result<ExportRequest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let request = ExportRequest::from_json(&raw)
        .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?;
    debug!(
        path = %path.display(),
        decks = request.decks.len(),
        cards = request.cards.len(),
        "request loaded"
    );
    Ok(request)
}
