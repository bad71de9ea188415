// 📬 Request Collection - Postman-style JSON → flat list of test requests
//
// Folders nest via `item` arrays; leaves carry a `request`. For every
// request we keep the method, URL template, `{{placeholders}}` used in URL
// and body, and the status code its test script expects.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

// ============================================================================
// EXPECTED STATUS
// ============================================================================

/// Status classification derived from a request's test script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpectedStatus {
    Single(u16),
    /// Script accepts either 200 or 400
    OkOrBadRequest,
    Unknown,
}

impl ExpectedStatus {
    pub fn label(&self) -> String {
        match self {
            ExpectedStatus::Single(code) => code.to_string(),
            ExpectedStatus::OkOrBadRequest => "200/400".to_string(),
            ExpectedStatus::Unknown => "unknown".to_string(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ExpectedStatus::OkOrBadRequest)
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for ExpectedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

fn or_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)200\s+or\s+400").expect("valid pattern"))
}

fn expect_list_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pm\.expect\(\[200,\s*400\]\)").expect("valid pattern"))
}

fn status_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(200|201|400|404|500)\b").expect("valid pattern"))
}

/// Classify the expected status from test-script lines
pub fn expected_status_from_script(lines: &[String]) -> ExpectedStatus {
    let script = lines.join("\n");

    if or_pattern().is_match(&script) || expect_list_pattern().is_match(&script) {
        return ExpectedStatus::OkOrBadRequest;
    }
    if script.contains("oneOf") && script.contains("200") && script.contains("400") {
        return ExpectedStatus::OkOrBadRequest;
    }

    for line in lines {
        if !(line.contains("pm.response.to.have.status") || line.contains("pm.expect(pm.response.code)")) {
            continue;
        }
        if let Some(code) = status_code_pattern()
            .captures(line)
            .and_then(|caps| caps[1].parse::<u16>().ok())
        {
            return ExpectedStatus::Single(code);
        }
    }

    ExpectedStatus::Unknown
}

// ============================================================================
// VARIABLES
// ============================================================================

fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid pattern"))
}

/// Every `{{name}}` placeholder in a template
pub fn extract_variables(text: &str) -> BTreeSet<String> {
    placeholder_pattern()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

// ============================================================================
// TEST REQUEST
// ============================================================================

/// One request from the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRequest {
    pub name: String,
    pub folder: String,
    pub method: String,
    pub url: String,
    /// Sorted, deduplicated
    pub variables: Vec<String>,
    pub expected_status: ExpectedStatus,
}

impl TestRequest {
    pub fn new(name: impl Into<String>, folder: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        TestRequest {
            name: name.into(),
            folder: folder.into(),
            method: method.into(),
            variables: extract_variables(&url).into_iter().collect(),
            url,
            expected_status: ExpectedStatus::Unknown,
        }
    }

    /// Builder: add placeholders from a body template
    pub fn with_body(mut self, body: &str) -> Self {
        let mut all: BTreeSet<String> = self.variables.into_iter().collect();
        all.extend(extract_variables(body));
        self.variables = all.into_iter().collect();
        self
    }

    /// Builder: set expected status
    pub fn with_expected_status(mut self, status: ExpectedStatus) -> Self {
        self.expected_status = status;
        self
    }
}

// ============================================================================
// COLLECTION TRAVERSAL
// ============================================================================

fn name_of(item: &Value) -> &str {
    item.get("name").and_then(Value::as_str).unwrap_or("Unnamed")
}

fn url_of(request: &Value) -> String {
    match request.get("url") {
        Some(Value::String(raw)) => raw.clone(),
        Some(url) => url
            .get("raw")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        None => String::new(),
    }
}

fn script_lines(event: &Value) -> Option<Vec<String>> {
    let exec = event.get("script")?.get("exec")?;
    let lines = match exec {
        Value::String(text) => text.lines().map(str::to_string).collect(),
        Value::Array(lines) => lines
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Some(lines)
}

/// First test event whose script names a status wins
fn expected_status_of(item: &Value) -> ExpectedStatus {
    item.get("event")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|evt| evt.get("listen").and_then(Value::as_str) == Some("test"))
        .filter_map(script_lines)
        .map(|lines| expected_status_from_script(&lines))
        .find(|status| !matches!(status, ExpectedStatus::Unknown))
        .unwrap_or(ExpectedStatus::Unknown)
}

fn parse_request(item: &Value, request: &Value, folder: &str) -> TestRequest {
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or("GET");

    let body = request
        .get("body")
        .and_then(|b| b.get("raw"))
        .and_then(Value::as_str)
        .unwrap_or("");

    TestRequest::new(name_of(item), folder, method, url_of(request))
        .with_body(body)
        .with_expected_status(expected_status_of(item))
}

fn walk_items(items: &[Value], folder: &str, out: &mut Vec<TestRequest>) {
    for item in items {
        if let Some(children) = item.get("item") {
            let name = name_of(item);
            let path = if folder.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", folder, name)
            };

            match children.as_array() {
                Some(children) => walk_items(children, &path, out),
                None => tracing::warn!(folder = %path, "folder `item` is not an array; skipped"),
            }
        } else if let Some(request) = item.get("request") {
            out.push(parse_request(item, request, folder));
        }
    }
}

/// Flatten a parsed collection into requests, in document order
pub fn requests_from_value(collection: &Value) -> Vec<TestRequest> {
    let mut requests = Vec::new();

    if let Some(items) = collection.get("item").and_then(Value::as_array) {
        walk_items(items, "", &mut requests);
    }

    requests
}

/// Read and flatten a collection file
pub fn load_collection<P: AsRef<Path>>(path: P) -> Result<Vec<TestRequest>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open collection file: {}", path.display()))?;

    let json: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;

    let requests = requests_from_value(&json);
    tracing::info!(count = requests.len(), "test requests loaded");

    Ok(requests)
}

// ============================================================================
// TESTS
// ============================================================================
