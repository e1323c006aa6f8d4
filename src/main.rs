use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod clock;
mod config;
mod datetime;
mod error;
mod metadata;
mod reconcile;
mod scan;
#[cfg(test)]
mod test_support;

use config::{MalformedDatePolicy, ReconcileConfig};
use error::{Error, Result};
use reconcile::Outcome;

/// Sync JPEG modification times with their Exif capture dates
///
/// Files with a DateTimeOriginal tag get their mtime set to it. Files without
/// one get the tag written from their current mtime.
#[derive(Parser, Debug)]
#[command(name = "photo-date-sync", version, about)]
struct Cli {
    /// Folder to scan recursively (defaults to the current directory)
    root: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write DateTime and DateTimeDigitized when adding a capture date
    #[arg(long)]
    all_dates: bool,

    /// Fail a file whose capture date can't be parsed instead of falling back
    #[arg(long)]
    strict_dates: bool,

    /// Carry on with the next file after an error
    #[arg(long)]
    keep_going: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Counts for the end-of-run summary
#[derive(Debug, Default)]
struct RunSummary {
    synced: usize,
    unchanged: usize,
    tagged: usize,
    failed: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the effective settings: file first, flags on top
fn load_config(cli: &Cli) -> Result<ReconcileConfig> {
    let mut config = match &cli.config {
        Some(path) => ReconcileConfig::load(path)?,
        None => ReconcileConfig::new(),
    };

    if cli.all_dates {
        config.populate = ReconcileConfig::all_dates().populate;
    }
    if cli.strict_dates {
        config.malformed_dates = MalformedDatePolicy::Error;
    }

    Ok(config)
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = load_config(cli)?;
    if let Ok(json) = config.to_json() {
        debug!(config = %json, "effective settings");
    }

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().map_err(|e| Error::io(".", e))?,
    };
    if !root.is_dir() {
        return Err(Error::io(
            &root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    println!("🔍 Scanning folder: {}", root.display());
    let files = scan::find_jpegs(&root);
    if files.is_empty() {
        println!("📭 No JPEG files found");
        return Ok(RunSummary::default());
    }

    let summary = process_files(&files, &config, cli.keep_going)?;

    println!(
        "📊 {} files: {} synced, {} already matching, {} tagged, {} failed",
        files.len(),
        summary.synced,
        summary.unchanged,
        summary.tagged,
        summary.failed
    );

    Ok(summary)
}

/// Reconcile files one at a time; without `keep_going` the first error ends the run
fn process_files(files: &[PathBuf], config: &ReconcileConfig, keep_going: bool) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for path in files {
        match reconcile::reconcile(path, config) {
            Ok(outcome) => {
                report(path, &outcome);
                match outcome {
                    Outcome::Synced { .. } => summary.synced += 1,
                    Outcome::Unchanged { .. } => summary.unchanged += 1,
                    Outcome::Tagged { .. } => summary.tagged += 1,
                }
            }
            Err(e) if keep_going => {
                eprintln!("⚠️  {}", e);
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// One progress line per file
fn report(path: &Path, outcome: &Outcome) {
    if outcome.fell_back() {
        println!(
            "⚠️  {}: unreadable capture date, using {}",
            path.display(),
            datetime::format_exif(datetime::fallback_time())
        );
    }

    match outcome {
        Outcome::Synced {
            captured,
            previous,
            applied,
            ..
        } => println!(
            "🕒 {}: {} → {} (captured {})",
            path.display(),
            datetime::format_exif(*previous),
            datetime::format_exif(*applied),
            captured
        ),
        Outcome::Unchanged { captured, .. } => {
            println!("✅ {}: {}", path.display(), captured)
        }
        Outcome::Tagged { written, tags, .. } => {
            let names: Vec<&str> = tags.iter().map(|id| id.name()).collect();
            println!(
                "🏷️  {}: no capture date, wrote {} = {}",
                path.display(),
                names.join(", "),
                written
            )
        }
    }
}
