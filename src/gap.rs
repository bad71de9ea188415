// 📊 Gap Aggregator - per-request verdicts + corpus summary
//
// Each request's variables are classified once. The resulting records are
// read-only; the summary is a single fold over them and can be recomputed
// any number of times with the same result.

use crate::classifier::CoverageClassifier;
use crate::collection::{ExpectedStatus, TestRequest};
use crate::config::ReportConfig;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// COVERAGE VERDICT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageVerdict {
    /// Every variable resolves to seed data
    Matched,
    /// At least one variable does not; names in request order
    Missing(Vec<String>),
    /// Request has no variables
    NoVars,
}

impl CoverageVerdict {
    /// Fold per-variable results into a verdict
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut seen_any = false;
        let mut missing = Vec::new();

        for (name, covered) in results {
            seen_any = true;
            if !covered {
                missing.push(name.to_string());
            }
        }

        if !seen_any {
            CoverageVerdict::NoVars
        } else if missing.is_empty() {
            CoverageVerdict::Matched
        } else {
            CoverageVerdict::Missing(missing)
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            CoverageVerdict::Matched => "MATCHED",
            CoverageVerdict::Missing(_) => "MISSING",
            CoverageVerdict::NoVars => "NO_VARS",
        }
    }

    pub fn missing_variables(&self) -> &[String] {
        match self {
            CoverageVerdict::Missing(names) => names,
            _ => &[],
        }
    }

    fn note(&self) -> String {
        match self {
            CoverageVerdict::Matched => "All variables have matching seed data".to_string(),
            CoverageVerdict::Missing(names) => {
                format!("Missing seed data for: {}", names.join(", "))
            }
            CoverageVerdict::NoVars => "No variables used in this request".to_string(),
        }
    }
}

impl fmt::Display for CoverageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

impl Serialize for CoverageVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.status())
    }
}

// ============================================================================
// AUDIT RECORD
// ============================================================================

/// Audit outcome for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub request_name: String,
    pub folder: String,
    pub method: String,
    /// URL without base-URL placeholder and query string
    pub endpoint: String,
    pub variables: Vec<String>,
    pub expected_status: ExpectedStatus,
    pub seed_status: CoverageVerdict,
    pub missing_variables: Vec<String>,
    pub uses_pagination: bool,
    pub notes: Vec<String>,
}

/// Strip the base-URL placeholder and the query string
pub fn endpoint_path(url: &str, base_url_placeholder: &str) -> String {
    let url = if base_url_placeholder.is_empty() {
        url.to_string()
    } else {
        url.replace(base_url_placeholder, "")
    };

    match url.split_once('?') {
        Some((path, _)) => path.to_string(),
        None => url,
    }
}

fn uses_pagination(url: &str) -> bool {
    url.contains('?') || url.contains("page=") || url.contains("limit=")
}

fn is_src101_folder(folder: &str) -> bool {
    let folder = folder.to_lowercase();
    folder.contains("src-101") || folder.contains("src101")
}

/// Classify one request's variables and build its record
pub fn audit_request(
    request: &TestRequest,
    classifier: &CoverageClassifier<'_>,
    config: &ReportConfig,
) -> AuditRecord {
    let verdict = CoverageVerdict::from_results(
        request
            .variables
            .iter()
            .map(|v| (v.as_str(), classifier.is_seeded(v))),
    );

    let paginated = uses_pagination(&request.url);

    let mut notes = vec![verdict.note()];
    if request.expected_status.is_multi() {
        notes.push("⚠️  Accepts both 200 and 400 status codes".to_string());
    }
    if is_src101_folder(&request.folder) {
        notes.push("SRC-101 endpoint".to_string());
    }
    if paginated {
        notes.push("Uses pagination/filtering parameters".to_string());
    }

    AuditRecord {
        request_name: request.name.clone(),
        folder: request.folder.clone(),
        method: request.method.clone(),
        endpoint: endpoint_path(&request.url, &config.base_url_placeholder),
        variables: request.variables.clone(),
        expected_status: request.expected_status,
        missing_variables: verdict.missing_variables().to_vec(),
        seed_status: verdict,
        uses_pagination: paginated,
        notes,
    }
}

/// Audit every request, in order
pub fn audit_requests(
    requests: &[TestRequest],
    classifier: &CoverageClassifier<'_>,
    config: &ReportConfig,
) -> Vec<AuditRecord> {
    let records: Vec<AuditRecord> = requests
        .iter()
        .map(|request| audit_request(request, classifier, config))
        .collect();

    tracing::info!(count = records.len(), "requests audited");
    records
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSummary {
    pub total_requests: usize,
    pub matched: usize,
    pub missing: usize,
    pub no_variables: usize,
    /// One decimal; 0.0 for an empty corpus
    pub match_percentage: f64,
    pub multi_status_requests: usize,
    pub requests_with_pagination: usize,
    pub method_breakdown: BTreeMap<String, usize>,
    pub folder_breakdown: BTreeMap<String, usize>,
    pub missing_variables: Vec<String>,
    pub requests_by_status_code: BTreeMap<String, usize>,
}

impl GapSummary {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut summary = GapSummary {
            total_requests: records.len(),
            matched: 0,
            missing: 0,
            no_variables: 0,
            match_percentage: 0.0,
            multi_status_requests: 0,
            requests_with_pagination: 0,
            method_breakdown: BTreeMap::new(),
            folder_breakdown: BTreeMap::new(),
            missing_variables: Vec::new(),
            requests_by_status_code: BTreeMap::new(),
        };
        let mut missing_vars = BTreeSet::new();

        for record in records {
            match &record.seed_status {
                CoverageVerdict::Matched => summary.matched += 1,
                CoverageVerdict::Missing(names) => {
                    summary.missing += 1;
                    missing_vars.extend(names.iter().cloned());
                }
                CoverageVerdict::NoVars => summary.no_variables += 1,
            }

            if record.expected_status.is_multi() {
                summary.multi_status_requests += 1;
            }
            if record.uses_pagination {
                summary.requests_with_pagination += 1;
            }

            *summary
                .method_breakdown
                .entry(record.method.clone())
                .or_insert(0) += 1;

            if !record.folder.is_empty() {
                *summary
                    .folder_breakdown
                    .entry(record.folder.clone())
                    .or_insert(0) += 1;
            }

            *summary
                .requests_by_status_code
                .entry(record.expected_status.label())
                .or_insert(0) += 1;
        }

        if !records.is_empty() {
            let pct = summary.matched as f64 / records.len() as f64 * 100.0;
            summary.match_percentage = (pct * 10.0).round() / 10.0;
        }
        summary.missing_variables = missing_vars.into_iter().collect();

        summary
    }

    pub fn has_gaps(&self) -> bool {
        self.missing > 0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingMap;
    use crate::config::ClassifierConfig;
    use crate::seed::{SeedCategory, SeedSets};

    fn fixture() -> (BindingMap, SeedSets, ClassifierConfig) {
        let bindings: BindingMap = [("test_block".to_string(), "820000".to_string())]
            .into_iter()
            .collect();
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::BlockIndexes, "820000");
        (bindings, seeds, ClassifierConfig::default())
    }

    fn four_requests() -> Vec<TestRequest> {
        vec![
            TestRequest::new("health", "System", "GET", "/api/v2/health"),
            TestRequest::new("block", "Blocks", "GET", "{{baseUrl}}/api/v2/block/{{test_block}}"),
            TestRequest::new("stamp", "Stamps", "GET", "{{baseUrl}}/api/v2/stamps/{{test_cpid}}"),
            TestRequest::new("src101", "SRC-101", "POST", "{{baseUrl}}/api/v2/src101?page={{page}}")
                .with_body("{\"tokenid\": \"{{test_tokenid}}\"}")
                .with_expected_status(ExpectedStatus::OkOrBadRequest),
        ]
    }

    #[test]
    fn test_verdict_from_results() {
        assert_eq!(CoverageVerdict::from_results(Vec::<(&str, bool)>::new()), CoverageVerdict::NoVars);
        assert_eq!(
            CoverageVerdict::from_results(vec![("a", true), ("b", true)]),
            CoverageVerdict::Matched
        );
        assert_eq!(
            CoverageVerdict::from_results(vec![("a", true), ("b", false), ("c", false)]),
            CoverageVerdict::Missing(vec!["b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_endpoint_path() {
        assert_eq!(
            endpoint_path("{{baseUrl}}/api/v2/stamps?limit=5", "{{baseUrl}}"),
            "/api/v2/stamps"
        );
        assert_eq!(endpoint_path("/plain", "{{baseUrl}}"), "/plain");
    }

    #[test]
    fn test_four_request_corpus_summary() {
        let (bindings, seeds, config) = fixture();
        let classifier = CoverageClassifier::new(&bindings, &seeds, &config);
        let records = audit_requests(&four_requests(), &classifier, &ReportConfig::default());

        let summary = GapSummary::from_records(&records);

        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.no_variables, 1);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.missing, 2);
        assert_eq!(summary.match_percentage, 25.0);
        assert_eq!(summary.missing_variables, vec!["test_cpid", "test_tokenid"]);
        assert_eq!(summary.method_breakdown.get("GET"), Some(&3));
        assert_eq!(summary.method_breakdown.get("POST"), Some(&1));
        assert_eq!(summary.multi_status_requests, 1);
        assert_eq!(summary.requests_with_pagination, 1);
        assert_eq!(summary.requests_by_status_code.get("200/400"), Some(&1));
        assert_eq!(summary.requests_by_status_code.get("unknown"), Some(&3));
        assert!(summary.has_gaps());
    }

    #[test]
    fn test_record_notes() {
        let (bindings, seeds, config) = fixture();
        let classifier = CoverageClassifier::new(&bindings, &seeds, &config);
        let records = audit_requests(&four_requests(), &classifier, &ReportConfig::default());

        assert_eq!(records[0].notes, vec!["No variables used in this request"]);
        assert_eq!(records[1].notes, vec!["All variables have matching seed data"]);
        assert_eq!(records[1].endpoint, "/api/v2/block/{{test_block}}");

        let src101 = &records[3];
        assert_eq!(src101.seed_status.status(), "MISSING");
        assert_eq!(src101.missing_variables, vec!["test_tokenid"]);
        assert_eq!(
            src101.notes,
            vec![
                "Missing seed data for: test_tokenid",
                "⚠️  Accepts both 200 and 400 status codes",
                "SRC-101 endpoint",
                "Uses pagination/filtering parameters",
            ]
        );
    }

    #[test]
    fn test_summary_is_idempotent() {
        let (bindings, seeds, config) = fixture();
        let classifier = CoverageClassifier::new(&bindings, &seeds, &config);
        let records = audit_requests(&four_requests(), &classifier, &ReportConfig::default());

        assert_eq!(GapSummary::from_records(&records), GapSummary::from_records(&records));
    }

    #[test]
    fn test_empty_corpus() {
        let summary = GapSummary::from_records(&[]);

        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.match_percentage, 0.0);
        assert!(summary.folder_breakdown.is_empty());
    }

    #[test]
    fn test_folder_breakdown_skips_root_requests() {
        let (bindings, seeds, config) = fixture();
        let classifier = CoverageClassifier::new(&bindings, &seeds, &config);
        let requests = vec![
            TestRequest::new("a", "", "GET", "/a"),
            TestRequest::new("b", "Stamps", "GET", "/b"),
            TestRequest::new("c", "Stamps", "GET", "/c"),
        ];

        let summary = GapSummary::from_records(&audit_requests(&requests, &classifier, &ReportConfig::default()));

        assert_eq!(summary.folder_breakdown.len(), 1);
        assert_eq!(summary.folder_breakdown.get("Stamps"), Some(&2));
    }
}
