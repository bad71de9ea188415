// 🔗 Header Bindings - explicit test-variable values from seed comments
//
//   -- Test variables:
//   --   test_block = 820000
//   --   test_cpid = A888354448084788958
//
// Only the first `scan_lines` lines are read. Anything else is ignored.

use crate::config::BindingConfig;
use std::collections::BTreeMap;

/// Variable name → literal value. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingMap {
    values: BTreeMap<String, String>,
}

impl BindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for BindingMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        BindingMap {
            values: iter.into_iter().collect(),
        }
    }
}

/// Parse one `-- name = value` line
fn parse_binding_line<'a>(line: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let body = line.trim().strip_prefix("--")?;
    let (name, value) = body.split_once('=')?;
    let name = name.trim();

    if !name.starts_with(prefix) {
        return None;
    }

    Some((name, value.trim()))
}

/// Read bindings from the leading comment lines of a seed source
pub fn read_bindings(source: &str, config: &BindingConfig) -> BindingMap {
    let mut map = BindingMap::new();

    for line in source.lines().take(config.scan_lines) {
        if let Some((name, value)) = parse_binding_line(line, &config.prefix) {
            map.values.insert(name.to_string(), value.to_string());
        }
    }

    tracing::info!(count = map.len(), "header bindings read");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_prefixed_bindings() {
        let source = "-- Seed data for API tests\n\
                      -- Test variables:\n\
                      --   test_block = 820000\n\
                      --   test_cpid=A888354448084788958\n\
                      --   other_var = 7\n\
                      INSERT INTO blocks (block_index) VALUES (820000);\n";

        let map = read_bindings(source, &BindingConfig::default());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("test_block"), Some("820000"));
        assert_eq!(map.get("test_cpid"), Some("A888354448084788958"));
        assert!(!map.contains("other_var"));
    }

    #[test]
    fn test_lines_past_window_are_ignored() {
        let mut source = String::new();
        for _ in 0..30 {
            source.push_str("-- filler\n");
        }
        source.push_str("-- test_late = 1\n");

        let map = read_bindings(&source, &BindingConfig::default());
        assert!(map.is_empty());

        let wide = BindingConfig {
            scan_lines: 31,
            ..BindingConfig::default()
        };
        assert_eq!(read_bindings(&source, &wide).get("test_late"), Some("1"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let map = read_bindings("-- test_query = a=b", &BindingConfig::default());

        assert_eq!(map.get("test_query"), Some("a=b"));
    }

    #[test]
    fn test_non_comment_lines_ignored() {
        let map = read_bindings("test_block = 1\n# test_x = 2", &BindingConfig::default());

        assert!(map.is_empty());
    }

    #[test]
    fn test_later_duplicate_wins() {
        let map = read_bindings(
            "-- test_tick = stamp\n-- test_tick = kevin",
            &BindingConfig::default(),
        );

        assert_eq!(map.get("test_tick"), Some("kevin"));
    }
}
