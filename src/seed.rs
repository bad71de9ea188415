// 🌱 Seed Data - INSERT/REPLACE statements → categorized seed sets
//
// Pipeline:
//   source text → scan_statements() → lex_values() → RowExtractor → SeedSets
//
// Extraction is tolerant: mismatched rows, unknown tables and malformed
// statements are skipped, never reported as errors.

use crate::lexer::{lex_values, Row};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ============================================================================
// SEED CATEGORIES
// ============================================================================

/// Fixed set of seed-data categories
///
/// Every extraction rule and every classifier rule names one of these, so a
/// new category shows up as a compile error in every `match` that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedCategory {
    Cpids,
    Ticks,
    BlockIndexes,
    TxHashes,
    Addresses,
    StampNumbers,
    CreatorNames,
    Collections,
    Src20Ticks,
    Src101Ticks,
    TokenIds,
    DeployHashes,
}

impl SeedCategory {
    pub const ALL: [SeedCategory; 12] = [
        SeedCategory::Cpids,
        SeedCategory::Ticks,
        SeedCategory::BlockIndexes,
        SeedCategory::TxHashes,
        SeedCategory::Addresses,
        SeedCategory::StampNumbers,
        SeedCategory::CreatorNames,
        SeedCategory::Collections,
        SeedCategory::Src20Ticks,
        SeedCategory::Src101Ticks,
        SeedCategory::TokenIds,
        SeedCategory::DeployHashes,
    ];

    /// Human-readable label for console output
    pub fn label(&self) -> &'static str {
        match self {
            SeedCategory::Cpids => "CPIDs",
            SeedCategory::Ticks => "ticks",
            SeedCategory::BlockIndexes => "block indexes",
            SeedCategory::TxHashes => "tx hashes",
            SeedCategory::Addresses => "addresses",
            SeedCategory::StampNumbers => "stamp numbers",
            SeedCategory::CreatorNames => "creator names",
            SeedCategory::Collections => "collections",
            SeedCategory::Src20Ticks => "SRC-20 ticks",
            SeedCategory::Src101Ticks => "SRC-101 ticks",
            SeedCategory::TokenIds => "SRC-101 token IDs",
            SeedCategory::DeployHashes => "deploy hashes",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SEED SETS
// ============================================================================

/// Category → set of seeded values. Accumulate-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSets {
    sets: [BTreeSet<String>; 12],
}

impl SeedSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: SeedCategory, value: impl Into<String>) -> bool {
        self.sets[category.index()].insert(value.into())
    }

    pub fn get(&self, category: SeedCategory) -> &BTreeSet<String> {
        &self.sets[category.index()]
    }

    pub fn contains(&self, category: SeedCategory, value: &str) -> bool {
        self.get(category).contains(value)
    }

    pub fn is_populated(&self, category: SeedCategory) -> bool {
        !self.get(category).is_empty()
    }

    pub fn len(&self, category: SeedCategory) -> usize {
        self.get(category).len()
    }

    pub fn total_values(&self) -> usize {
        self.sets.iter().map(BTreeSet::len).sum()
    }

    /// Per-category counts, in category order
    pub fn counts(&self) -> BTreeMap<SeedCategory, usize> {
        SeedCategory::ALL
            .iter()
            .map(|c| (*c, self.len(*c)))
            .collect()
    }
}

// ============================================================================
// INSERT STATEMENTS
// ============================================================================

/// One `INSERT INTO t (cols) VALUES ...;` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub values: String,
}

fn statement_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"(?is)\b(?:INSERT|REPLACE)\s+INTO\s+`?(\w+)`?\s*\(([^)]*)\)\s*VALUES\s*")
            .expect("statement header pattern is valid")
    })
}

/// Find the statement terminator, skipping `;` inside quoted literals
///
/// Returns the byte offset of the `;`, or `None` when the text runs out.
/// A literal left open at the end falls back to the first raw `;`.
fn find_terminator(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escape_pending = false;

    for (i, c) in text.char_indices() {
        if escape_pending {
            escape_pending = false;
            continue;
        }
        match c {
            '\\' => escape_pending = true,
            '\'' => in_string = !in_string,
            ';' if !in_string => return Some(i),
            _ => {}
        }
    }

    if in_string {
        tracing::debug!("unbalanced quote in statement; ending it at the first ';'");
        return text.find(';');
    }

    None
}

fn clean_column(raw: &str) -> String {
    raw.trim().trim_matches('`').trim_matches('"').to_string()
}

/// Extract every INSERT/REPLACE statement from a seed source
pub fn scan_statements(source: &str) -> Vec<InsertStatement> {
    let header = statement_header();
    let mut statements = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = header.captures_at(source, cursor) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let body_start = whole.end();
        // A statement never runs past the next header
        let limit = header
            .find_at(source, body_start)
            .map_or(source.len(), |m| m.start());
        let rest = &source[body_start..limit];

        let (values, next) = match find_terminator(rest) {
            Some(end) => (&rest[..end], body_start + end + 1),
            None => (rest, limit),
        };

        statements.push(InsertStatement {
            table: caps[1].to_string(),
            columns: caps[2].split(',').map(clean_column).collect(),
            values: values.to_string(),
        });

        cursor = next;
    }

    statements
}

// ============================================================================
// FIELD NORMALIZATION
// ============================================================================

/// Trim, map `NULL` to `None`, strip one pair of enclosing single quotes
///
/// Inner escapes are left untouched.
pub fn normalize_field(raw: &str) -> Option<String> {
    let value = raw.trim();

    if value.eq_ignore_ascii_case("NULL") {
        return None;
    }

    if value.starts_with('\'') && value.ends_with('\'') {
        // a lone quote strips down to nothing
        let inner = value.get(1..value.len() - 1).unwrap_or("");
        return Some(inner.to_string());
    }

    Some(value.to_string())
}

// ============================================================================
// EXTRACTION RULES (rules as data)
// ============================================================================

/// Which columns of which tables feed which seed set
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub tables: &'static [&'static str],
    pub columns: &'static [(&'static str, SeedCategory)],
}

pub const EXTRACTION_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        tables: &["stamptablev4", "stamps"],
        columns: &[
            ("cpid", SeedCategory::Cpids),
            ("tick", SeedCategory::Ticks),
            ("block_index", SeedCategory::BlockIndexes),
            ("tx_hash", SeedCategory::TxHashes),
            ("creator", SeedCategory::Addresses),
            ("stamp", SeedCategory::StampNumbers),
        ],
    },
    ExtractionRule {
        tables: &["creator"],
        columns: &[
            ("creator", SeedCategory::CreatorNames),
            ("address", SeedCategory::Addresses),
        ],
    },
    ExtractionRule {
        tables: &["src20valid", "src20"],
        columns: &[
            ("tick", SeedCategory::Src20Ticks),
            ("creator", SeedCategory::Addresses),
            ("destination", SeedCategory::Addresses),
            ("tx_hash", SeedCategory::TxHashes),
            ("block_index", SeedCategory::BlockIndexes),
        ],
    },
    ExtractionRule {
        tables: &["src101valid", "src101"],
        columns: &[
            ("tick", SeedCategory::Src101Ticks),
            ("creator", SeedCategory::Addresses),
            ("owner", SeedCategory::Addresses),
            ("destination", SeedCategory::Addresses),
            ("tx_hash", SeedCategory::TxHashes),
            ("tokenid", SeedCategory::TokenIds),
            ("deploy_hash", SeedCategory::DeployHashes),
        ],
    },
    ExtractionRule {
        tables: &["blocks"],
        columns: &[("block_index", SeedCategory::BlockIndexes)],
    },
    ExtractionRule {
        tables: &["transactions"],
        columns: &[
            ("tx_hash", SeedCategory::TxHashes),
            ("source", SeedCategory::Addresses),
            ("destination", SeedCategory::Addresses),
        ],
    },
    ExtractionRule {
        tables: &["collections"],
        columns: &[("collection_id", SeedCategory::Collections)],
    },
];

/// Look up the rule for a table name (case-insensitive)
pub fn rule_for_table(table: &str) -> Option<&'static ExtractionRule> {
    EXTRACTION_RULES
        .iter()
        .find(|rule| rule.tables.iter().any(|t| t.eq_ignore_ascii_case(table)))
}

// ============================================================================
// ROW EXTRACTOR
// ============================================================================

/// Counters collected while extracting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedParseStats {
    pub statements: usize,
    pub rows_extracted: usize,
    pub rows_skipped: usize,
    pub unknown_tables: BTreeSet<String>,
}

/// Feeds lexed rows into seed sets according to `EXTRACTION_RULES`
#[derive(Debug, Default)]
pub struct RowExtractor {
    sets: SeedSets,
    stats: SeedParseStats,
}

impl RowExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every row of one statement
    pub fn extract_statement(&mut self, statement: &InsertStatement) {
        self.stats.statements += 1;

        let Some(rule) = rule_for_table(&statement.table) else {
            tracing::debug!(table = %statement.table, "no extraction rule for table; ignored");
            self.stats
                .unknown_tables
                .insert(statement.table.to_lowercase());
            return;
        };

        for row in lex_values(&statement.values) {
            self.extract_row(&statement.table, rule, &statement.columns, &row);
        }
    }

    fn extract_row(&mut self, table: &str, rule: &ExtractionRule, columns: &[String], row: &Row) {
        if columns.len() != row.len() {
            tracing::debug!(
                table,
                columns = columns.len(),
                values = row.len(),
                "column/value count mismatch; row skipped"
            );
            self.stats.rows_skipped += 1;
            return;
        }

        for (column, raw) in columns.iter().zip(row) {
            let Some(value) = normalize_field(raw) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            for (rule_column, category) in rule.columns {
                if rule_column.eq_ignore_ascii_case(column) {
                    self.sets.insert(*category, value.clone());
                }
            }
        }

        self.stats.rows_extracted += 1;
    }

    pub fn finish(self) -> (SeedSets, SeedParseStats) {
        (self.sets, self.stats)
    }
}

/// Parse a whole seed source into seed sets
pub fn extract_seed_sets(source: &str) -> (SeedSets, SeedParseStats) {
    let mut extractor = RowExtractor::new();

    for statement in scan_statements(source) {
        extractor.extract_statement(&statement);
    }

    let (sets, stats) = extractor.finish();
    tracing::info!(
        statements = stats.statements,
        rows = stats.rows_extracted,
        skipped = stats.rows_skipped,
        values = sets.total_values(),
        "seed data extracted"
    );

    (sets, stats)
}

// ============================================================================
// SEED SOURCE (file input)
// ============================================================================

/// Seed source text, read fully before parsing
#[derive(Debug, Clone)]
pub struct SeedSource {
    pub path: PathBuf,
    pub text: String,
}

impl SeedSource {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed data file: {}", path.display()))?;

        Ok(SeedSource {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        SeedSource {
            path: PathBuf::new(),
            text: text.into(),
        }
    }

    /// SHA-256 of the source text, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================
