//! The built-in rule catalog.
//!
//! Twelve rules ship with the engine: six SIMPLE single-condition checks
//! and six COMPLEX multi-record analyses. Seeding is insert-if-absent per
//! rule code, so re-running the seed never duplicates or overwrites rules
//! an operator has since adjusted.

use serde_json::json;

use crate::config::RuleParameters;
use crate::error::EngineResult;
use crate::models::{Rule, RuleCategory, RuleType};
use crate::store::RuleStore;

/// Number of rules [`seed`] installs on a fresh catalog.
pub const BUILTIN_RULE_COUNT: usize = 12;

/// Returns the built-in rules in priority order, highest first.
///
/// Threshold parameters (the statutory floor, the spread bound) are baked
/// into the seeded expressions from `params`, so the catalog rows show
/// exactly the values the evaluator will apply.
pub fn builtin_rules(params: &RuleParameters) -> Vec<Rule> {
    vec![
        rule(
            "BASE_RATE_MINIMUM",
            "Base rates meet the statutory minimum",
            RuleType::Simple,
            RuleCategory::PayRate,
            900,
            json!({"check": "base_rate_minimum", "floor": params.base_rate_floor}),
            "Every classification's hourly base rate is at or above the floor",
        ),
        rule(
            "BASE_RATE_POSITIVE",
            "Base rates are positive",
            RuleType::Simple,
            RuleCategory::PayRate,
            880,
            json!({"check": "base_rate_positive"}),
            "Every staged base rate is strictly greater than zero",
        ),
        rule(
            "OPERATIVE_WINDOW_ORDER",
            "Operative window is ordered",
            RuleType::Simple,
            RuleCategory::Compliance,
            860,
            json!({"check": "operative_window_order"}),
            "The award's operative-from date does not fall after its operative-to date",
        ),
        rule(
            "CLASSIFICATIONS_PRESENT",
            "Classifications are present",
            RuleType::Simple,
            RuleCategory::Classification,
            840,
            json!({"check": "classifications_present"}),
            "The award defines at least one classification",
        ),
        rule(
            "ALLOWANCE_AMOUNT_PRESENT",
            "Allowance amounts are present",
            RuleType::Simple,
            RuleCategory::Allowance,
            820,
            json!({"check": "allowance_amount_present"}),
            "Every allowance row carries a dollar amount, or a rate it can be derived from",
        ),
        rule(
            "AWARD_VERSION_POSITIVE",
            "Award version is positive",
            RuleType::Simple,
            RuleCategory::Compliance,
            800,
            json!({"check": "award_version_positive"}),
            "The award carries a version number of at least 1",
        ),
        rule(
            "CLASSIFICATION_HIERARCHY",
            "Classification levels are contiguous",
            RuleType::Complex,
            RuleCategory::Classification,
            700,
            json!({"check": "classification_hierarchy"}),
            "Classification levels run from 1 to the highest level without gaps",
        ),
        rule(
            "RATE_PROGRESSION",
            "Rates progress with level",
            RuleType::Complex,
            RuleCategory::PayRate,
            680,
            json!({"check": "rate_progression"}),
            "The minimum adult base rate does not decrease as the classification level rises",
        ),
        rule(
            "CASUAL_RATE_LOADED",
            "Casual rates carry loading",
            RuleType::Complex,
            RuleCategory::PayRate,
            660,
            json!({"check": "casual_rate_loaded"}),
            "Every casual-coded pay-rate row has a calculated rate above its base rate",
        ),
        rule(
            "ALL_PURPOSE_CLAUSE_REF",
            "All-purpose allowances cite a clause",
            RuleType::Complex,
            RuleCategory::Allowance,
            640,
            json!({"check": "all_purpose_clause_ref"}),
            "Every all-purpose allowance row carries a clause reference",
        ),
        rule(
            "SUMMARY_DETAIL_CONSISTENT",
            "Summary counts match the detail fan-out",
            RuleType::Complex,
            RuleCategory::Compliance,
            620,
            json!({"check": "summary_detail_consistent"}),
            "The summary row counts equal the compiled detail rows per record type",
        ),
        rule(
            "BASE_RATE_SPREAD",
            "Base-rate spread is bounded",
            RuleType::Complex,
            RuleCategory::Compliance,
            600,
            json!({"check": "base_rate_spread", "max_ratio": params.max_rate_spread}),
            "The ratio of the highest to the lowest adult base rate stays within the bound",
        ),
    ]
}

/// Seeds the built-in rules, skipping codes already in the catalog.
///
/// Returns the number of rules inserted; zero means the catalog was
/// already fully seeded.
///
/// # Errors
///
/// Propagates storage faults from the rule store.
pub fn seed(store: &dyn RuleStore, params: &RuleParameters) -> EngineResult<usize> {
    let mut inserted = 0;
    for rule in builtin_rules(params) {
        if store.seed_rule(rule)? {
            inserted += 1;
        }
    }
    Ok(inserted)
}

fn rule(
    code: &str,
    name: &str,
    rule_type: RuleType,
    category: RuleCategory,
    priority: u16,
    expression: serde_json::Value,
    description: &str,
) -> Rule {
    Rule {
        rule_code: code.to_string(),
        rule_name: name.to_string(),
        rule_type,
        rule_category: category,
        priority,
        rule_expression: expression,
        description: description.to_string(),
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RuleFilter};
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_twelve_rules_split_evenly() {
        let rules = builtin_rules(&RuleParameters::default());
        assert_eq!(rules.len(), BUILTIN_RULE_COUNT);

        let simple = rules
            .iter()
            .filter(|r| r.rule_type == RuleType::Simple)
            .count();
        let complex = rules
            .iter()
            .filter(|r| r.rule_type == RuleType::Complex)
            .count();
        assert_eq!(simple, 6);
        assert_eq!(complex, 6);
    }

    #[test]
    fn test_rule_codes_are_unique() {
        let rules = builtin_rules(&RuleParameters::default());
        let codes: HashSet<&str> = rules.iter().map(|r| r.rule_code.as_str()).collect();
        assert_eq!(codes.len(), rules.len());
    }

    #[test]
    fn test_priorities_are_unique_and_descending() {
        let rules = builtin_rules(&RuleParameters::default());
        let priorities: Vec<u16> = rules.iter().map(|r| r.priority).collect();

        let mut sorted = priorities.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);

        let unique: HashSet<u16> = priorities.iter().copied().collect();
        assert_eq!(unique.len(), priorities.len());
    }

    #[test]
    fn test_every_expression_carries_a_check_discriminator() {
        for rule in builtin_rules(&RuleParameters::default()) {
            let check = rule.rule_expression.get("check").and_then(|v| v.as_str());
            assert!(
                check.is_some(),
                "rule {} has no check discriminator",
                rule.rule_code
            );
            assert!(rule.is_active);
            assert!(!rule.description.is_empty());
        }
    }

    #[test]
    fn test_threshold_parameters_injected_from_config() {
        let rules = builtin_rules(&RuleParameters::default());

        let floor_rule = rules
            .iter()
            .find(|r| r.rule_code == "BASE_RATE_MINIMUM")
            .unwrap();
        assert_eq!(floor_rule.rule_expression["floor"], "24.10");

        let spread_rule = rules
            .iter()
            .find(|r| r.rule_code == "BASE_RATE_SPREAD")
            .unwrap();
        assert_eq!(spread_rule.rule_expression["max_ratio"], "3.0");
    }

    #[test]
    fn test_seed_installs_twelve_then_none() {
        let store = MemoryStore::new();
        let params = RuleParameters::default();

        let first = seed(&store, &params).unwrap();
        assert_eq!(first, BUILTIN_RULE_COUNT);

        let second = seed(&store, &params).unwrap();
        assert_eq!(second, 0);

        let rules = store.rules(&RuleFilter::default()).unwrap();
        assert_eq!(rules.len(), BUILTIN_RULE_COUNT);
    }

    #[test]
    fn test_seed_preserves_existing_rule_edits() {
        let store = MemoryStore::new();
        let params = RuleParameters::default();

        let mut edited = builtin_rules(&params)
            .into_iter()
            .find(|r| r.rule_code == "BASE_RATE_MINIMUM")
            .unwrap();
        edited.rule_expression = serde_json::json!({"check": "base_rate_minimum", "floor": "30.00"});
        assert!(store.seed_rule(edited).unwrap());

        let inserted = seed(&store, &params).unwrap();
        assert_eq!(inserted, BUILTIN_RULE_COUNT - 1);

        let kept = store.rule("BASE_RATE_MINIMUM").unwrap().unwrap();
        assert_eq!(kept.rule_expression["floor"], "30.00");
    }

    #[test]
    fn test_seeded_catalog_reads_back_priority_ordered() {
        let store = MemoryStore::new();
        seed(&store, &RuleParameters::default()).unwrap();

        let rules = store.rules(&RuleFilter::default()).unwrap();
        assert_eq!(rules[0].rule_code, "BASE_RATE_MINIMUM");
        assert_eq!(rules[rules.len() - 1].rule_code, "BASE_RATE_SPREAD");
    }

    #[test]
    fn test_category_filter_selects_allowance_rules() {
        let store = MemoryStore::new();
        seed(&store, &RuleParameters::default()).unwrap();

        let allowance = store
            .rules(&RuleFilter {
                category: Some(RuleCategory::Allowance),
                ..RuleFilter::default()
            })
            .unwrap();
        assert_eq!(allowance.len(), 2);
        assert!(
            allowance
                .iter()
                .all(|r| r.rule_category == RuleCategory::Allowance)
        );
    }
}
