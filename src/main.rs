use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use seed_audit::collection::load_collection;
use seed_audit::logging::init_logging;
use seed_audit::report::{print_seed_stats, print_summary};
use seed_audit::{
    run_audit, write_csv_file, write_json_file, AuditConfig, GapReport, SeedSnapshot, SeedSource,
};

/// seed-audit: checks that API test requests have matching seed data.
#[derive(Debug, Parser)]
#[command(name = "seed-audit", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./seed-audit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cross-reference a request collection against seed data
    Audit {
        /// Postman-style collection JSON
        #[arg(long)]
        collection: PathBuf,

        /// SQL seed data file
        #[arg(long)]
        seed: PathBuf,

        /// Flat CSV report output
        #[arg(long, default_value = "gap-analysis.csv")]
        csv: PathBuf,

        /// Nested JSON report output
        #[arg(long, default_value = "gap-analysis.json")]
        json: PathBuf,
    },

    /// Show what a seed file contains
    Seeds {
        /// SQL seed data file
        #[arg(long)]
        seed: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AuditConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Command::Audit {
            collection,
            seed,
            csv,
            json,
        } => run_audit_command(&config, &collection, &seed, &csv, &json),
        Command::Seeds { seed } => run_seeds_command(&config, &seed),
    }
}

fn run_audit_command(
    config: &AuditConfig,
    collection_path: &Path,
    seed_path: &Path,
    csv_path: &Path,
    json_path: &Path,
) -> Result<()> {
    println!("🔍 Starting gap analysis...");
    println!("Collection: {}", collection_path.display());
    println!("Seed data: {}", seed_path.display());

    // 1. Read both inputs up front; either one missing stops the run
    println!("\n[1/4] Parsing seed data SQL...");
    let source = SeedSource::load(seed_path)?;

    println!("\n[2/4] Parsing request collection...");
    let requests = load_collection(collection_path)?;
    println!("  Found {} test requests", requests.len());

    // 2. Audit
    println!("\n[3/4] Analyzing gaps...");
    let outcome = run_audit(&source, &requests, config);
    print_seed_stats(&outcome.snapshot.seeds);

    println!("\n  Test variables found: {}", outcome.snapshot.bindings.len());
    for (name, value) in outcome.snapshot.bindings.iter() {
        println!("    {} = {}", name, value);
    }

    // 3. Reports
    println!("\n[4/4] Generating reports...");
    write_csv_file(csv_path, &outcome.records, &config.report.note_separator)?;
    println!("  CSV report: {}", csv_path.display());

    let metadata = outcome.metadata(collection_path, seed_path);
    let report = GapReport::new(metadata, &outcome.summary, &outcome.records);
    write_json_file(json_path, &report)?;
    println!("  JSON report: {}", json_path.display());

    print_summary(&outcome.summary);

    println!("\n✅ Gap analysis complete!");
    Ok(())
}

fn run_seeds_command(config: &AuditConfig, seed_path: &Path) -> Result<()> {
    println!("🌱 Seed data: {}", seed_path.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let source = SeedSource::load(seed_path)?;
    let snapshot = SeedSnapshot::from_source(&source, config);

    println!("\n📊 Statements: {}", snapshot.stats.statements);
    println!("✓ Rows extracted: {}", snapshot.stats.rows_extracted);
    if snapshot.stats.rows_skipped > 0 {
        println!("⚠️  Rows skipped (column/value mismatch): {}", snapshot.stats.rows_skipped);
    }
    if !snapshot.stats.unknown_tables.is_empty() {
        let tables: Vec<&str> = snapshot.stats.unknown_tables.iter().map(String::as_str).collect();
        println!("○ Tables without extraction rules: {}", tables.join(", "));
    }

    println!("\n🗂️  Seed sets:");
    print_seed_stats(&snapshot.seeds);

    println!("\n🔗 Header bindings: {}", snapshot.bindings.len());
    for (name, value) in snapshot.bindings.iter() {
        println!("    {} = {}", name, value);
    }

    println!("\nFingerprint: {}", snapshot.fingerprint);
    Ok(())
}
