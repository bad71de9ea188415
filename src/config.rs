// ⚙️ Audit Configuration - seed-audit.toml
//
// Every knob has a default, so a missing file is the same as an empty one.
//
//   [bindings]
//   scan_lines = 30
//   prefix = "test_"
//
//   [classifier]
//   exempt_markers = ["base_url", "baseurl", "dev_", "prod_"]
//   exempt_names = ["limit", "page", "offset", "sort", "order"]
//
//   [report]
//   note_separator = " | "
//   base_url_placeholder = "{{baseUrl}}"

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "seed-audit.toml";

// ============================================================================
// SECTIONS
// ============================================================================

/// Header comment bindings (`-- test_x = value`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// How many leading lines of the seed source are scanned
    pub scan_lines: usize,

    /// Names must start with this to be accepted
    pub prefix: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            scan_lines: 30,
            prefix: "test_".to_string(),
        }
    }
}

/// Variables that never need seed data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Substrings of the variable name, any case (environment / base URL markers)
    pub exempt_markers: Vec<String>,

    /// Exact variable names, any case (paging / sorting controls)
    pub exempt_names: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            exempt_markers: ["base_url", "baseurl", "dev_", "prod_"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exempt_names: ["limit", "page", "offset", "sort", "order"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Joins notes in the CSV report
    pub note_separator: String,

    /// Removed from URLs to get the endpoint path
    pub base_url_placeholder: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            note_separator: " | ".to_string(),
            base_url_placeholder: "{{baseUrl}}".to_string(),
        }
    }
}

// ============================================================================
// AUDIT CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub bindings: BindingConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
}

impl AuditConfig {
    /// Load and validate a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AuditConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Explicit path wins; otherwise `seed-audit.toml` if present; otherwise defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::info!(path = %fallback.display(), "using config file");
            return Self::load(&fallback);
        }

        Ok(AuditConfig::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.bindings.scan_lines == 0 {
            bail!("bindings.scan_lines must be at least 1");
        }
        if self.bindings.prefix.trim().is_empty() {
            bail!("bindings.prefix must not be empty");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();

        assert_eq!(config.bindings.scan_lines, 30);
        assert_eq!(config.bindings.prefix, "test_");
        assert!(config.classifier.exempt_names.contains(&"limit".to_string()));
        assert_eq!(config.report.note_separator, " | ");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AuditConfig = toml::from_str(
            r#"
            [bindings]
            scan_lines = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.bindings.scan_lines, 50);
        assert_eq!(config.bindings.prefix, "test_");
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let mut config = AuditConfig::default();
        config.bindings.scan_lines = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed-audit.toml");
        fs::write(&path, "[bindings]\nprefix = \"var_\"\n").unwrap();

        let config = AuditConfig::load(&path).unwrap();
        assert_eq!(config.bindings.prefix, "var_");
    }

    #[test]
    fn test_load_rejects_empty_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed-audit.toml");
        fs::write(&path, "[bindings]\nprefix = \"\"\n").unwrap();

        assert!(AuditConfig::load(&path).is_err());
    }
}
