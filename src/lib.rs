// Seed Audit - Core Library
// Checks that every API test request has the seed data it needs

pub mod lexer;
pub mod seed;
pub mod bindings;
pub mod classifier;
pub mod collection;
pub mod gap;
pub mod report;
pub mod config;
pub mod logging;
pub mod audit;

// Re-export commonly used types
pub use lexer::{lex_values, Row};
pub use seed::{
    SeedCategory, SeedSets, SeedSource, SeedParseStats,
    InsertStatement, RowExtractor, ExtractionRule, EXTRACTION_RULES,
    scan_statements, normalize_field, extract_seed_sets,
};
pub use bindings::{BindingMap, read_bindings};
pub use classifier::{
    CoverageClassifier, Resolution, Target, KeywordRule,
    BOUND_RULES, GENERIC_RULES,
};
pub use collection::{
    TestRequest, ExpectedStatus,
    load_collection, requests_from_value, extract_variables, expected_status_from_script,
};
pub use gap::{
    AuditRecord, CoverageVerdict, GapSummary,
    audit_request, audit_requests, endpoint_path,
};
pub use report::{
    AuditMetadata, ExecutiveSummary, GapReport,
    write_csv, write_csv_file, write_json, write_json_file,
};
pub use config::{AuditConfig, BindingConfig, ClassifierConfig, ReportConfig};
pub use audit::{AuditOutcome, SeedSnapshot, run_audit, audit_files};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
