// 📝 Gap Reports - CSV + JSON + console summary
//
// Both files come from the same records and summary:
// - CSV: one row per request, notes joined with the configured separator
// - JSON: metadata + executive summary + summary + full details

use crate::gap::{AuditRecord, GapSummary};
use crate::seed::{SeedCategory, SeedSets};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    request_name: &'a str,
    folder: &'a str,
    method: &'a str,
    endpoint: &'a str,
    variables: String,
    expected_status: String,
    seed_status: &'static str,
    notes: String,
}

impl<'a> CsvRow<'a> {
    fn from_record(record: &'a AuditRecord, note_separator: &str) -> Self {
        CsvRow {
            request_name: &record.request_name,
            folder: &record.folder,
            method: &record.method,
            endpoint: &record.endpoint,
            variables: record.variables.join(", "),
            expected_status: record.expected_status.label(),
            seed_status: record.seed_status.status(),
            notes: record.notes.join(note_separator),
        }
    }
}

/// Write the flat report to any writer
pub fn write_csv<W: Write>(writer: W, records: &[AuditRecord], note_separator: &str) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for record in records {
        csv.serialize(CsvRow::from_record(record, note_separator))
            .with_context(|| format!("Failed to write CSV row for {}", record.request_name))?;
    }

    // Header comes from the first serialized row; an empty corpus still gets one
    if records.is_empty() {
        csv.write_record([
            "request_name",
            "folder",
            "method",
            "endpoint",
            "variables",
            "expected_status",
            "seed_status",
            "notes",
        ])?;
    }

    csv.flush().context("Failed to flush CSV report")?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[AuditRecord], note_separator: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV report: {}", path.display()))?;

    write_csv(BufWriter::new(file), records, note_separator)
        .with_context(|| format!("Failed to write CSV report: {}", path.display()))
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuditMetadata {
    pub generated_at: DateTime<Utc>,
    pub collection_file: String,
    pub seed_data_file: String,
    /// SHA-256 of the seed source text
    pub seed_fingerprint: String,
    pub total_requests_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub overall_alignment: String,
    pub requests_with_gaps: usize,
    pub missing_variables: Vec<String>,
    pub special_attention_needed: Vec<String>,
}

impl ExecutiveSummary {
    pub fn from_summary(summary: &GapSummary) -> Self {
        ExecutiveSummary {
            overall_alignment: format!(
                "{:.1}% of requests have matching seed data",
                summary.match_percentage
            ),
            requests_with_gaps: summary.missing,
            missing_variables: summary.missing_variables.clone(),
            special_attention_needed: vec![
                format!(
                    "{} requests accept both 200 and 400 status codes",
                    summary.multi_status_requests
                ),
                format!(
                    "{} requests use pagination/filtering",
                    summary.requests_with_pagination
                ),
            ],
        }
    }
}

/// Nested report: metadata + executive summary + summary + details
#[derive(Debug, Clone, Serialize)]
pub struct GapReport<'a> {
    pub audit_metadata: AuditMetadata,
    pub executive_summary: ExecutiveSummary,
    pub summary: &'a GapSummary,
    pub details: &'a [AuditRecord],
}

impl<'a> GapReport<'a> {
    pub fn new(metadata: AuditMetadata, summary: &'a GapSummary, details: &'a [AuditRecord]) -> Self {
        GapReport {
            audit_metadata: metadata,
            executive_summary: ExecutiveSummary::from_summary(summary),
            summary,
            details,
        }
    }
}

pub fn write_json<W: Write>(writer: W, report: &GapReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).context("Failed to serialize JSON report")
}

pub fn write_json_file(path: &Path, report: &GapReport<'_>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON report: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    write_json(&mut writer, report)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))
}

// ============================================================================
// CONSOLE
// ============================================================================

/// Seed-set sizes with a few example values
pub fn print_seed_stats(seeds: &SeedSets) {
    for category in SeedCategory::ALL {
        let values = seeds.get(category);
        println!("  Found {} {}", values.len(), category.label());

        if !values.is_empty() {
            let examples: Vec<&str> = values.iter().take(3).map(String::as_str).collect();
            println!("    Examples: {}", examples.join(", "));
        }
    }
}

pub fn print_summary(summary: &GapSummary) {
    println!("\n{}", "=".repeat(80));
    println!("GAP ANALYSIS SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Total requests analyzed: {}", summary.total_requests);
    println!(
        "  - ✓ Matched (all vars have seed data): {} ({:.1}%)",
        summary.matched, summary.match_percentage
    );
    println!("  - ✗ Missing (some vars lack seed data): {}", summary.missing);
    println!("  - ○ No variables used: {}", summary.no_variables);

    if !summary.missing_variables.is_empty() {
        println!("\nMissing variables that need seed data:");
        for var in &summary.missing_variables {
            println!("  • {}", var);
        }
    }

    println!("\nRequest breakdown by method:");
    for (method, count) in &summary.method_breakdown {
        println!("  - {}: {}", method, count);
    }

    println!("\nRequest breakdown by expected status:");
    for (status, count) in &summary.requests_by_status_code {
        println!("  - {}: {}", status, count);
    }

    println!("\nSpecial cases:");
    println!("  - Tests accepting 200/400 status: {}", summary.multi_status_requests);
    println!(
        "  - Requests with pagination/filtering: {}",
        summary.requests_with_pagination
    );
    println!("{}", "=".repeat(80));
}

// ============================================================================
// TESTS
// ============================================================================
