//! Storage ports for staged, compiled, and catalog data.
//!
//! The compilers, the rule engine, and the calculator depend only on the
//! traits here, so tests can substitute fault-injecting doubles and a
//! future database adapter can slot in without touching the pipeline
//! code. [`MemoryStore`] is the in-process adapter used by the binary and
//! the test suite.

mod locks;
mod memory;

pub use locks::{AwardLockGuard, AwardLockRegistry};
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AgeCategory, AwardDetail, AwardSummary, CalculatedPayRate, CompileRunLog, DetailRecordKind,
    EmploymentType, RateDayType, Rule, RuleCategory, RuleExecutionLog, RuleType, ShiftType,
    StagedAward, StagedClassification, StagedExpenseAllowance, StagedPayRate, StagedPenalty,
    StagedWageAllowance,
};

/// Largest accepted `page_size` for paginated queries.
pub const MAX_PAGE_SIZE: usize = 500;

/// Default `page_size` when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Read access to the staged award tables.
///
/// Staging is read-only to the engine; loading it is the staging loader's
/// concern, not part of this port.
pub trait StagingStore: Send + Sync {
    /// Returns every staged award code, sorted ascending.
    fn award_codes(&self) -> EngineResult<Vec<String>>;
    /// Returns the staged award header for a code, if present.
    fn award(&self, code: &str) -> EngineResult<Option<StagedAward>>;
    /// Returns the staged classification rows for an award.
    fn classifications(&self, award_code: &str) -> EngineResult<Vec<StagedClassification>>;
    /// Returns the staged pay-rate rows for an award.
    fn pay_rates(&self, award_code: &str) -> EngineResult<Vec<StagedPayRate>>;
    /// Returns the staged expense allowance rows for an award.
    fn expense_allowances(&self, award_code: &str) -> EngineResult<Vec<StagedExpenseAllowance>>;
    /// Returns the staged wage allowance rows for an award.
    fn wage_allowances(&self, award_code: &str) -> EngineResult<Vec<StagedWageAllowance>>;
    /// Returns the staged penalty rows for an award.
    fn penalties(&self, award_code: &str) -> EngineResult<Vec<StagedPenalty>>;
}

/// Storage for compiled output rows and compile run logs.
///
/// Every `replace_*` method is one atomic unit: it removes the award's
/// existing rows and inserts the replacements in a single critical
/// section, so concurrent readers observe the pre- or post-compile state
/// and never a partial set.
pub trait CompiledStore: Send + Sync {
    /// Replaces the summary row for one award.
    fn replace_summary(&self, award_code: &str, rows: Vec<AwardSummary>) -> EngineResult<()>;
    /// Replaces the detail rows for one award.
    fn replace_details(&self, award_code: &str, rows: Vec<AwardDetail>) -> EngineResult<()>;
    /// Replaces the active calculated rows for one award.
    fn replace_rates(&self, award_code: &str, rows: Vec<CalculatedPayRate>) -> EngineResult<()>;
    /// Returns true if the award has active calculated rows.
    fn has_active_rates(&self, award_code: &str) -> EngineResult<bool>;
    /// Returns the summary rows matching a filter, sorted by award code.
    fn summaries(&self, filter: &AwardFilter) -> EngineResult<Vec<AwardSummary>>;
    /// Returns the detail rows matching a filter.
    fn details(&self, filter: &DetailFilter) -> EngineResult<Vec<AwardDetail>>;
    /// Returns one page of calculated rows matching a filter.
    fn rates(&self, filter: &RateFilter, page: Page) -> EngineResult<RatePage>;
    /// Appends one compile run log row.
    fn append_run_log(&self, log: CompileRunLog) -> EngineResult<()>;
    /// Returns all run log rows, most recent first.
    fn run_logs(&self) -> EngineResult<Vec<CompileRunLog>>;
}

/// Storage for the rule catalog and its execution log.
pub trait RuleStore: Send + Sync {
    /// Inserts a rule unless its `rule_code` already exists. Returns true
    /// if the rule was inserted.
    fn seed_rule(&self, rule: Rule) -> EngineResult<bool>;
    /// Returns the rule with the given code, if present.
    fn rule(&self, rule_code: &str) -> EngineResult<Option<Rule>>;
    /// Returns the rules matching a filter, ordered by priority descending
    /// then rule code.
    fn rules(&self, filter: &RuleFilter) -> EngineResult<Vec<Rule>>;
    /// Appends one execution log row.
    fn append_execution_log(&self, log: RuleExecutionLog) -> EngineResult<()>;
    /// Returns execution log rows, most recent first, optionally narrowed
    /// to one execution id.
    fn execution_logs(&self, execution_id: Option<Uuid>) -> EngineResult<Vec<RuleExecutionLog>>;
}

/// Filter for award summary queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwardFilter {
    /// Exact award code.
    pub code: Option<String>,
    /// Case-insensitive substring of the industry.
    pub industry: Option<String>,
    /// Restrict to active (or inactive) awards.
    pub active: Option<bool>,
}

impl AwardFilter {
    /// Returns true if the summary row passes this filter.
    pub fn matches(&self, summary: &AwardSummary) -> bool {
        let code_ok = self
            .code
            .as_ref()
            .is_none_or(|code| summary.award_code.eq_ignore_ascii_case(code));
        let industry_ok = self.industry.as_ref().is_none_or(|industry| {
            summary
                .industry
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&industry.to_lowercase())
        });
        let active_ok = self.active.is_none_or(|active| summary.is_active == active);
        code_ok && industry_ok && active_ok
    }
}

/// Filter for award detail queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFilter {
    /// Exact award code.
    pub award_code: Option<String>,
    /// Restrict to one record kind.
    pub record_type: Option<DetailRecordKind>,
    /// Classification restriction: a numeric value matches the
    /// classification's fixed id, anything else its name.
    pub classification: Option<String>,
}

impl DetailFilter {
    /// Returns true if the detail row passes this filter.
    pub fn matches(&self, detail: &AwardDetail) -> bool {
        let code_ok = self
            .award_code
            .as_ref()
            .is_none_or(|code| detail.award_code.eq_ignore_ascii_case(code));
        let kind_ok = self
            .record_type
            .is_none_or(|kind| detail.record.kind() == kind);
        let classification_ok = self.classification.as_ref().is_none_or(|classification| {
            classification_matches(
                classification,
                detail.record.classification_name(),
                detail_fixed_id(detail),
            )
        });
        code_ok && kind_ok && classification_ok
    }
}

fn detail_fixed_id(detail: &AwardDetail) -> Option<i64> {
    match &detail.record {
        crate::models::DetailRecord::Classification {
            classification_fixed_id,
            ..
        }
        | crate::models::DetailRecord::PayRate {
            classification_fixed_id,
            ..
        } => Some(*classification_fixed_id),
        _ => None,
    }
}

/// Matches a classification restriction against a name and fixed id.
pub(crate) fn classification_matches(
    restriction: &str,
    name: Option<&str>,
    fixed_id: Option<i64>,
) -> bool {
    if let Ok(id) = restriction.parse::<i64>() {
        return fixed_id == Some(id);
    }
    name.is_some_and(|n| n.eq_ignore_ascii_case(restriction))
}

/// Filter for calculated pay-rate queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
    /// Exact award code.
    pub award_code: Option<String>,
    /// Classification restriction, as for [`DetailFilter`].
    pub classification: Option<String>,
    /// Restrict to one employment type.
    pub employment_type: Option<EmploymentType>,
    /// Restrict to one day type.
    pub day_type: Option<RateDayType>,
    /// Restrict to one shift type.
    pub shift_type: Option<ShiftType>,
    /// Restrict to one age category.
    pub age_category: Option<AgeCategory>,
}

impl RateFilter {
    /// Returns true if the calculated row passes this filter.
    pub fn matches(&self, rate: &CalculatedPayRate) -> bool {
        let code_ok = self
            .award_code
            .as_ref()
            .is_none_or(|code| rate.award_code.eq_ignore_ascii_case(code));
        let classification_ok = self.classification.as_ref().is_none_or(|classification| {
            classification_matches(
                classification,
                Some(rate.classification.as_str()),
                Some(rate.classification_fixed_id),
            )
        });
        code_ok
            && classification_ok
            && self
                .employment_type
                .is_none_or(|e| rate.employment_type == e)
            && self.day_type.is_none_or(|d| rate.day_type == d)
            && self.shift_type.is_none_or(|s| rate.shift_type == s)
            && self.age_category.is_none_or(|a| rate.age_category == a)
    }
}

/// Filter for rule catalog queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFilter {
    /// Restrict to one rule type.
    pub rule_type: Option<RuleType>,
    /// Restrict to one rule category.
    pub category: Option<RuleCategory>,
    /// Restrict to active (or inactive) rules.
    pub active: Option<bool>,
}

impl RuleFilter {
    /// Returns true if the rule passes this filter.
    pub fn matches(&self, rule: &Rule) -> bool {
        self.rule_type.is_none_or(|t| rule.rule_type == t)
            && self.category.is_none_or(|c| rule.rule_category == c)
            && self.active.is_none_or(|a| rule.is_active == a)
    }
}

/// A 1-based page request for calculated-rate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page, 1 to [`MAX_PAGE_SIZE`].
    pub page_size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Validates the page parameters, rejecting out-of-range values
    /// before any query work happens.
    pub fn validate(&self) -> EngineResult<()> {
        if self.page < 1 {
            return Err(EngineError::InvalidFilter {
                field: "page".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(EngineError::InvalidFilter {
                field: "page_size".to_string(),
                message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        Ok(())
    }

    /// Returns the row offset of this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// One page of calculated pay rates plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePage {
    /// The rows on this page.
    pub rates: Vec<CalculatedPayRate>,
    /// Echo of the requested page number.
    pub page: usize,
    /// Echo of the requested page size.
    pub page_size: usize,
    /// Total matching rows across all pages.
    pub total_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_default() {
        let page = Page::default();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_page_zero_rejected() {
        let page = Page {
            page: 0,
            page_size: 50,
        };
        assert!(matches!(
            page.validate(),
            Err(EngineError::InvalidFilter { field, .. }) if field == "page"
        ));
    }

    #[test]
    fn test_page_size_bounds() {
        let too_big = Page {
            page: 1,
            page_size: MAX_PAGE_SIZE + 1,
        };
        assert!(too_big.validate().is_err());

        let max = Page {
            page: 1,
            page_size: MAX_PAGE_SIZE,
        };
        assert!(max.validate().is_ok());

        let zero = Page {
            page: 1,
            page_size: 0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_page_offset() {
        let page = Page {
            page: 3,
            page_size: 50,
        };
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_classification_matches_numeric_as_fixed_id() {
        assert!(classification_matches("101", Some("Level 1"), Some(101)));
        assert!(!classification_matches("102", Some("Level 1"), Some(101)));
        assert!(!classification_matches("101", Some("101"), None));
    }

    #[test]
    fn test_classification_matches_name_case_insensitive() {
        assert!(classification_matches("level 1", Some("Level 1"), Some(101)));
        assert!(!classification_matches("level 2", Some("Level 1"), Some(101)));
    }
}
