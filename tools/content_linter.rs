/// Content Linter: validates phrase packs before they reach classrooms.
///
/// Usage: content_linter <pack_file_or_dir> [--standalone] [--strict]
///
/// Packs are checked as overlays on the built-in content unless
/// `--standalone` is given.

use clap::Parser;
use shiksha_sparks::core::phrasebook::PhraseBook;
use shiksha_sparks::core::pipeline::lint_pack;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "content_linter", about = "Lint Shiksha Sparks content packs")]
struct Cli {
    /// A `.ron` pack, or a directory searched recursively for packs
    path: PathBuf,
    /// Lint the packs on their own; they must define every required rule
    #[arg(long)]
    standalone: bool,
    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut pack = PhraseBook::default();
    if cli.path.is_file() {
        match PhraseBook::load_from_ron(&cli.path) {
            Ok(loaded) => pack.merge(loaded),
            Err(e) => {
                eprintln!("ERROR: Failed to load pack: {}", e);
                process::exit(1);
            }
        }
    } else if cli.path.is_dir() {
        if !load_packs_recursive(&cli.path, &mut pack) {
            process::exit(1);
        }
    } else {
        eprintln!("ERROR: Path '{}' does not exist", cli.path.display());
        process::exit(1);
    }

    println!("Loaded {} phrase rules", pack.rules.len());

    let report = match lint_pack(pack, cli.standalone) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("ERROR: Built-in content failed to load: {}", e);
            process::exit(1);
        }
    };

    println!("\n=== Content Lint Report ===\n");

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }

    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    let failed = !report.is_clean() || (cli.strict && !report.warnings.is_empty());
    process::exit(if failed { 1 } else { 0 });
}

/// Returns false if any pack failed to load.
fn load_packs_recursive(dir: &Path, book: &mut PhraseBook) -> bool {
    let mut ok = true;
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(e) => {
            eprintln!("  ERROR reading {}: {}", dir.display(), e);
            return false;
        }
    };
    paths.sort();

    for path in paths {
        if path.is_dir() {
            ok &= load_packs_recursive(&path, book);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match PhraseBook::load_from_ron(&path) {
                Ok(pack) => {
                    println!("  Loaded: {}", path.display());
                    book.merge(pack);
                }
                Err(e) => {
                    eprintln!("  ERROR loading {}: {}", path.display(), e);
                    ok = false;
                }
            }
        }
    }
    ok
}
