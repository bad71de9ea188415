// 🔍 Seed Audit - end-to-end pipeline
//
//   seed source → seed sets + bindings ─┐
//                                       ├→ classifier → records → summary
//   collection  → test requests ────────┘
//
// Seed sets and bindings are finished before any request is classified,
// and nothing is written to them afterwards.

use crate::bindings::{read_bindings, BindingMap};
use crate::classifier::CoverageClassifier;
use crate::collection::{load_collection, TestRequest};
use crate::config::AuditConfig;
use crate::gap::{audit_requests, AuditRecord, GapSummary};
use crate::report::AuditMetadata;
use crate::seed::{extract_seed_sets, SeedParseStats, SeedSets, SeedSource};
use anyhow::Result;
use chrono::Utc;
use std::path::Path;

/// Everything learned from the seed source
#[derive(Debug, Clone)]
pub struct SeedSnapshot {
    pub seeds: SeedSets,
    pub stats: SeedParseStats,
    pub bindings: BindingMap,
    pub fingerprint: String,
}

impl SeedSnapshot {
    pub fn from_source(source: &SeedSource, config: &AuditConfig) -> Self {
        let (seeds, stats) = extract_seed_sets(&source.text);
        let bindings = read_bindings(&source.text, &config.bindings);

        SeedSnapshot {
            seeds,
            stats,
            bindings,
            fingerprint: source.fingerprint(),
        }
    }

    pub fn classifier<'a>(&'a self, config: &'a AuditConfig) -> CoverageClassifier<'a> {
        CoverageClassifier::new(&self.bindings, &self.seeds, &config.classifier)
    }
}

/// Result of one audit run
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub snapshot: SeedSnapshot,
    pub records: Vec<AuditRecord>,
    pub summary: GapSummary,
}

impl AuditOutcome {
    pub fn metadata(&self, collection_file: &Path, seed_data_file: &Path) -> AuditMetadata {
        AuditMetadata {
            generated_at: Utc::now(),
            collection_file: file_label(collection_file),
            seed_data_file: file_label(seed_data_file),
            seed_fingerprint: self.snapshot.fingerprint.clone(),
            total_requests_analyzed: self.records.len(),
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Audit already-loaded inputs
pub fn run_audit(source: &SeedSource, requests: &[TestRequest], config: &AuditConfig) -> AuditOutcome {
    let snapshot = SeedSnapshot::from_source(source, config);
    let records = {
        let classifier = snapshot.classifier(config);
        audit_requests(requests, &classifier, &config.report)
    };
    let summary = GapSummary::from_records(&records);

    AuditOutcome {
        snapshot,
        records,
        summary,
    }
}

/// Read both input files, then audit. Either file failing to load is fatal.
pub fn audit_files(collection_path: &Path, seed_path: &Path, config: &AuditConfig) -> Result<AuditOutcome> {
    let source = SeedSource::load(seed_path)?;
    let requests = load_collection(collection_path)?;

    Ok(run_audit(&source, &requests, config))
}
