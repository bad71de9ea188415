// 🏷️ Variable Coverage Classifier - does a test variable have seed data?
//
// Decision order:
//   1. structural exemptions (base URLs, paging/sort controls)
//   2. bound path: variable has a header binding → exact value lookup
//   3. generic path: keyword → "is that category seeded at all"
//   4. nothing matched → not covered
//
// Both keyword tables are first-match-wins. Their order decides ambiguous
// names like `test_address_tick`, so reordering changes audit results.

use crate::bindings::BindingMap;
use crate::config::ClassifierConfig;
use crate::seed::{SeedCategory, SeedSets};
use serde::Serialize;

// ============================================================================
// KEYWORD RULES (rules as data)
// ============================================================================

/// What a matched keyword rule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// One seed set
    Set(SeedCategory),
    /// Any of several seed sets
    AnyOf(&'static [SeedCategory]),
    /// Treated as available without looking at seed data
    Always,
}

/// Matches when every `all_of` keyword is present and, if `any_of` is
/// non-empty, at least one of those is too
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub target: Target,
}

impl KeywordRule {
    const fn all(all_of: &'static [&'static str], target: Target) -> Self {
        KeywordRule {
            all_of,
            any_of: &[],
            target,
        }
    }

    const fn any(any_of: &'static [&'static str], target: Target) -> Self {
        KeywordRule {
            all_of: &[],
            any_of,
            target,
        }
    }

    pub fn matches(&self, name_lower: &str) -> bool {
        self.all_of.iter().all(|k| name_lower.contains(k))
            && (self.any_of.is_empty() || self.any_of.iter().any(|k| name_lower.contains(k)))
    }
}

const ANY_PROTOCOL_TICK: &[SeedCategory] = &[SeedCategory::Src20Ticks, SeedCategory::Src101Ticks];

const ANY_TICK: &[SeedCategory] = &[
    SeedCategory::Ticks,
    SeedCategory::Src20Ticks,
    SeedCategory::Src101Ticks,
];

/// Bound variables: the header value must be present in the category
pub const BOUND_RULES: &[KeywordRule] = &[
    KeywordRule::all(&["cpid"], Target::Set(SeedCategory::Cpids)),
    KeywordRule::all(&["block"], Target::Set(SeedCategory::BlockIndexes)),
    KeywordRule::all(&["stamp", "id"], Target::Set(SeedCategory::StampNumbers)),
    KeywordRule::all(&["address"], Target::Set(SeedCategory::Addresses)),
    KeywordRule::all(&["tx", "hash"], Target::Set(SeedCategory::TxHashes)),
    KeywordRule::all(&["src20", "tick"], Target::Set(SeedCategory::Src20Ticks)),
    // negative stamp numbers; sparse, so not checked value-by-value
    KeywordRule::all(&["cursed"], Target::Always),
    KeywordRule::all(&["deploy", "hash"], Target::Set(SeedCategory::DeployHashes)),
    KeywordRule::all(&["tokenid"], Target::Set(SeedCategory::TokenIds)),
    KeywordRule::all(&["tick"], Target::AnyOf(ANY_PROTOCOL_TICK)),
    KeywordRule::any(&["index", "number"], Target::Always),
];

/// Unbound variables: the category only has to be non-empty
pub const GENERIC_RULES: &[KeywordRule] = &[
    KeywordRule::all(&["cpid"], Target::Set(SeedCategory::Cpids)),
    KeywordRule::all(&["tokenid"], Target::Set(SeedCategory::TokenIds)),
    KeywordRule::all(&["deploy", "hash"], Target::Set(SeedCategory::DeployHashes)),
    KeywordRule::all(&["tick", "src20"], Target::Set(SeedCategory::Src20Ticks)),
    KeywordRule {
        all_of: &["tick"],
        any_of: &["src101", "src-101"],
        target: Target::Set(SeedCategory::Src101Ticks),
    },
    KeywordRule::all(&["tick"], Target::AnyOf(ANY_TICK)),
    KeywordRule::all(&["block"], Target::Set(SeedCategory::BlockIndexes)),
    KeywordRule::all(&["tx", "hash"], Target::Set(SeedCategory::TxHashes)),
    KeywordRule::all(&["address"], Target::Set(SeedCategory::Addresses)),
    KeywordRule::all(&["creator", "name"], Target::Set(SeedCategory::CreatorNames)),
    KeywordRule::all(&["creator"], Target::Set(SeedCategory::Addresses)),
    KeywordRule::all(&["stamp"], Target::Set(SeedCategory::StampNumbers)),
    KeywordRule::all(&["collection"], Target::Set(SeedCategory::Collections)),
    KeywordRule::all(&["cursed"], Target::Always),
];

fn first_match(rules: &'static [KeywordRule], name_lower: &str) -> Option<Target> {
    rules
        .iter()
        .find(|rule| rule.matches(name_lower))
        .map(|rule| rule.target)
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// How a variable name was resolved, and whether it is covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum Resolution {
    /// Configuration marker; never needs seed data
    Exempt,
    /// Header binding checked against the seed set
    Bound {
        value: String,
        target: Target,
        covered: bool,
    },
    /// Keyword match, existence check only
    Generic { target: Target, covered: bool },
    /// No keyword matched
    Unresolved,
}

impl Resolution {
    pub fn is_covered(&self) -> bool {
        match self {
            Resolution::Exempt => true,
            Resolution::Bound { covered, .. } => *covered,
            Resolution::Generic { covered, .. } => *covered,
            Resolution::Unresolved => false,
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Read-only view over bindings + seed sets. Holds no state of its own.
pub struct CoverageClassifier<'a> {
    bindings: &'a BindingMap,
    seeds: &'a SeedSets,
    config: &'a ClassifierConfig,
}

impl<'a> CoverageClassifier<'a> {
    pub fn new(bindings: &'a BindingMap, seeds: &'a SeedSets, config: &'a ClassifierConfig) -> Self {
        CoverageClassifier {
            bindings,
            seeds,
            config,
        }
    }

    /// Configured markers and names match regardless of case
    pub fn is_exempt(&self, name_lower: &str) -> bool {
        self.config
            .exempt_markers
            .iter()
            .any(|m| name_lower.contains(&m.to_lowercase()))
            || self
                .config
                .exempt_names
                .iter()
                .any(|n| n.to_lowercase() == name_lower)
    }

    fn has_value(&self, target: Target, value: &str) -> bool {
        match target {
            Target::Set(category) => self.seeds.contains(category, value),
            Target::AnyOf(categories) => categories.iter().any(|c| self.seeds.contains(*c, value)),
            Target::Always => true,
        }
    }

    fn is_populated(&self, target: Target) -> bool {
        match target {
            Target::Set(category) => self.seeds.is_populated(category),
            Target::AnyOf(categories) => categories.iter().any(|c| self.seeds.is_populated(*c)),
            Target::Always => true,
        }
    }

    /// Resolve a variable name
    pub fn classify(&self, name: &str) -> Resolution {
        let name_lower = name.to_lowercase();

        if self.is_exempt(&name_lower) {
            return Resolution::Exempt;
        }

        // A binding whose name matches no bound rule falls through to the
        // generic path.
        if let Some(value) = self.bindings.get(name) {
            if let Some(target) = first_match(BOUND_RULES, &name_lower) {
                return Resolution::Bound {
                    value: value.to_string(),
                    target,
                    covered: self.has_value(target, value),
                };
            }
        }

        match first_match(GENERIC_RULES, &name_lower) {
            Some(target) => Resolution::Generic {
                target,
                covered: self.is_populated(target),
            },
            None => Resolution::Unresolved,
        }
    }

    pub fn is_seeded(&self, name: &str) -> bool {
        self.classify(name).is_covered()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> BindingMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bound_block_checks_exact_value() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_block", "820000")]);

        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::BlockIndexes, "820000");
        assert!(CoverageClassifier::new(&map, &seeds, &config).is_seeded("test_block"));

        let mut other = SeedSets::new();
        other.insert(SeedCategory::BlockIndexes, "820001");
        assert!(!CoverageClassifier::new(&map, &other, &config).is_seeded("test_block"));
    }

    #[test]
    fn test_generic_address_depends_only_on_population() {
        let config = ClassifierConfig::default();
        let map = BindingMap::new();

        let empty = SeedSets::new();
        assert!(!CoverageClassifier::new(&map, &empty, &config).is_seeded("some_address_param"));

        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Addresses, "bc1qanything");
        let classifier = CoverageClassifier::new(&map, &seeds, &config);
        assert!(classifier.is_seeded("some_address_param"));
        assert_eq!(
            classifier.classify("some_address_param"),
            Resolution::Generic {
                target: Target::Set(SeedCategory::Addresses),
                covered: true
            }
        );
    }

    #[test]
    fn test_exemptions_need_no_seed_data() {
        let config = ClassifierConfig::default();
        let map = BindingMap::new();
        let empty = SeedSets::new();
        let classifier = CoverageClassifier::new(&map, &empty, &config);

        for name in ["limit", "page", "offset", "sort", "order", "baseUrl", "dev_base_url", "prod_host"] {
            assert_eq!(classifier.classify(name), Resolution::Exempt, "{}", name);
        }
        // exact-name exemptions only
        assert!(!classifier.is_seeded("limit_block"));
    }

    #[test]
    fn test_configured_exemptions_ignore_case() {
        let config = ClassifierConfig {
            exempt_markers: vec!["baseURL".to_string()],
            exempt_names: vec!["PageSize".to_string()],
        };
        let map = BindingMap::new();
        let empty = SeedSets::new();
        let classifier = CoverageClassifier::new(&map, &empty, &config);

        assert_eq!(classifier.classify("baseUrl"), Resolution::Exempt);
        assert_eq!(classifier.classify("stagingBaseUrl"), Resolution::Exempt);
        assert_eq!(classifier.classify("pagesize"), Resolution::Exempt);
        assert!(!classifier.is_seeded("limit"));
    }

    #[test]
    fn test_unknown_name_is_not_covered() {
        let config = ClassifierConfig::default();
        let map = BindingMap::new();
        let mut seeds = SeedSets::new();
        for category in SeedCategory::ALL {
            seeds.insert(category, "x");
        }

        let classifier = CoverageClassifier::new(&map, &seeds, &config);
        assert_eq!(classifier.classify("mystery_param"), Resolution::Unresolved);
    }

    #[test]
    fn test_bound_priority_block_before_address() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_block_address", "bc1q")]);
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Addresses, "bc1q");

        // `block` wins, and bc1q is not a block index
        let classifier = CoverageClassifier::new(&map, &seeds, &config);
        assert!(!classifier.is_seeded("test_block_address"));
    }

    #[test]
    fn test_bound_tick_accepts_either_protocol() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_tick", "bitname")]);
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Src101Ticks, "bitname");

        assert!(CoverageClassifier::new(&map, &seeds, &config).is_seeded("test_tick"));
    }

    #[test]
    fn test_bound_src20_tick_only_checks_src20() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_src20_tick", "stamp")]);
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Src101Ticks, "stamp");

        assert!(!CoverageClassifier::new(&map, &seeds, &config).is_seeded("test_src20_tick"));
    }

    #[test]
    fn test_cursed_is_always_available() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_cursed_id", "-1832")]);
        let empty = SeedSets::new();
        let classifier = CoverageClassifier::new(&map, &empty, &config);

        assert!(classifier.is_seeded("test_cursed_id"));
        assert!(classifier.is_seeded("cursed_param"));
    }

    #[test]
    fn test_bound_generic_index_is_available() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_index", "1942")]);
        let empty = SeedSets::new();

        assert!(CoverageClassifier::new(&map, &empty, &config).is_seeded("test_index"));
        // without a binding, `index` alone matches nothing
        let unbound = BindingMap::new();
        assert!(!CoverageClassifier::new(&unbound, &empty, &config).is_seeded("test_index"));
    }

    #[test]
    fn test_binding_without_bound_keyword_falls_through() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_creator_name", "Someone")]);
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::CreatorNames, "Someone Else");

        let classifier = CoverageClassifier::new(&map, &seeds, &config);
        assert_eq!(
            classifier.classify("test_creator_name"),
            Resolution::Generic {
                target: Target::Set(SeedCategory::CreatorNames),
                covered: true
            }
        );
    }

    #[test]
    fn test_generic_tick_variants() {
        let config = ClassifierConfig::default();
        let map = BindingMap::new();
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Ticks, "kevin");
        let classifier = CoverageClassifier::new(&map, &seeds, &config);

        assert!(classifier.is_seeded("tick"));
        assert!(!classifier.is_seeded("src20_tick"));
        assert!(!classifier.is_seeded("src-101_tick"));
    }

    #[test]
    fn test_generic_creator_name_vs_creator() {
        let config = ClassifierConfig::default();
        let map = BindingMap::new();
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Addresses, "bc1q");
        let classifier = CoverageClassifier::new(&map, &seeds, &config);

        assert!(classifier.is_seeded("creator"));
        assert!(!classifier.is_seeded("creator_name"));
    }

    #[test]
    fn test_binding_lookup_is_case_sensitive() {
        let config = ClassifierConfig::default();
        let map = bindings(&[("test_cpid", "A1")]);
        let mut seeds = SeedSets::new();
        seeds.insert(SeedCategory::Cpids, "A2");
        let classifier = CoverageClassifier::new(&map, &seeds, &config);

        // bound: value A1 is missing
        assert!(!classifier.is_seeded("test_cpid"));
        // different case is unbound: only population matters
        assert!(classifier.is_seeded("TEST_CPID"));
    }
}
