//! In-process storage adapter backed by `RwLock` tables.

use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AwardDetail, AwardSummary, CalculatedPayRate, CompileRunLog, Rule, RuleExecutionLog,
    StagedAward, StagedClassification, StagedExpenseAllowance, StagedPayRate, StagedPenalty,
    StagedWageAllowance, StagingDataset,
};

use super::{
    AwardFilter, CompiledStore, DetailFilter, Page, RateFilter, RatePage, RuleFilter, RuleStore,
    StagingStore,
};

/// In-memory implementation of all three storage ports.
///
/// Each table sits behind its own `RwLock`; every replace happens inside
/// one write critical section, so readers observe the pre- or post-state
/// of an award's rows and never a partial replacement.
#[derive(Debug, Default)]
pub struct MemoryStore {
    staging: RwLock<StagingDataset>,
    summaries: RwLock<Vec<AwardSummary>>,
    details: RwLock<Vec<AwardDetail>>,
    rates: RwLock<Vec<CalculatedPayRate>>,
    rules: RwLock<Vec<Rule>>,
    execution_logs: RwLock<Vec<RuleExecutionLog>>,
    run_logs: RwLock<Vec<CompileRunLog>>,
}

fn read<'a, T>(lock: &'a RwLock<T>, table: &str) -> EngineResult<std::sync::RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| EngineError::storage(format!("{table} lock poisoned")))
}

fn write<'a, T>(
    lock: &'a RwLock<T>,
    table: &str,
) -> EngineResult<std::sync::RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| EngineError::storage(format!("{table} lock poisoned")))
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire staged dataset.
    ///
    /// The staging tables are read-only to the pipeline; this is the one
    /// entry point the staging loader uses.
    pub fn load_staging(&self, dataset: StagingDataset) -> EngineResult<()> {
        let mut staging = write(&self.staging, "staging")?;
        *staging = dataset;
        Ok(())
    }
}

impl StagingStore for MemoryStore {
    fn award_codes(&self) -> EngineResult<Vec<String>> {
        let staging = read(&self.staging, "staging")?;
        let mut codes: Vec<String> = staging.awards.iter().map(|a| a.code.clone()).collect();
        codes.sort();
        codes.dedup();
        Ok(codes)
    }

    fn award(&self, code: &str) -> EngineResult<Option<StagedAward>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .awards
            .iter()
            .find(|a| a.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    fn classifications(&self, award_code: &str) -> EngineResult<Vec<StagedClassification>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .classifications
            .iter()
            .filter(|c| c.award_code.eq_ignore_ascii_case(award_code))
            .cloned()
            .collect())
    }

    fn pay_rates(&self, award_code: &str) -> EngineResult<Vec<StagedPayRate>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .pay_rates
            .iter()
            .filter(|r| r.award_code.eq_ignore_ascii_case(award_code))
            .cloned()
            .collect())
    }

    fn expense_allowances(&self, award_code: &str) -> EngineResult<Vec<StagedExpenseAllowance>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .expense_allowances
            .iter()
            .filter(|a| a.award_code.eq_ignore_ascii_case(award_code))
            .cloned()
            .collect())
    }

    fn wage_allowances(&self, award_code: &str) -> EngineResult<Vec<StagedWageAllowance>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .wage_allowances
            .iter()
            .filter(|a| a.award_code.eq_ignore_ascii_case(award_code))
            .cloned()
            .collect())
    }

    fn penalties(&self, award_code: &str) -> EngineResult<Vec<StagedPenalty>> {
        let staging = read(&self.staging, "staging")?;
        Ok(staging
            .penalties
            .iter()
            .filter(|p| p.award_code.eq_ignore_ascii_case(award_code))
            .cloned()
            .collect())
    }
}

impl CompiledStore for MemoryStore {
    fn replace_summary(&self, award_code: &str, rows: Vec<AwardSummary>) -> EngineResult<()> {
        let mut summaries = write(&self.summaries, "summaries")?;
        summaries.retain(|s| !s.award_code.eq_ignore_ascii_case(award_code));
        summaries.extend(rows);
        Ok(())
    }

    fn replace_details(&self, award_code: &str, rows: Vec<AwardDetail>) -> EngineResult<()> {
        let mut details = write(&self.details, "details")?;
        details.retain(|d| !d.award_code.eq_ignore_ascii_case(award_code));
        details.extend(rows);
        Ok(())
    }

    fn replace_rates(&self, award_code: &str, rows: Vec<CalculatedPayRate>) -> EngineResult<()> {
        let mut rates = write(&self.rates, "rates")?;
        rates.retain(|r| !r.award_code.eq_ignore_ascii_case(award_code));
        rates.extend(rows);
        Ok(())
    }

    fn has_active_rates(&self, award_code: &str) -> EngineResult<bool> {
        let rates = read(&self.rates, "rates")?;
        Ok(rates
            .iter()
            .any(|r| r.award_code.eq_ignore_ascii_case(award_code) && r.is_active))
    }

    fn summaries(&self, filter: &AwardFilter) -> EngineResult<Vec<AwardSummary>> {
        let summaries = read(&self.summaries, "summaries")?;
        let mut matching: Vec<AwardSummary> = summaries
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.award_code.cmp(&b.award_code));
        Ok(matching)
    }

    fn details(&self, filter: &DetailFilter) -> EngineResult<Vec<AwardDetail>> {
        let details = read(&self.details, "details")?;
        Ok(details
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    fn rates(&self, filter: &RateFilter, page: Page) -> EngineResult<RatePage> {
        page.validate()?;
        let rates = read(&self.rates, "rates")?;
        let matching: Vec<&CalculatedPayRate> =
            rates.iter().filter(|r| filter.matches(r)).collect();
        let total_records = matching.len();
        let rows = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .cloned()
            .collect();
        Ok(RatePage {
            rates: rows,
            page: page.page,
            page_size: page.page_size,
            total_records,
        })
    }

    fn append_run_log(&self, log: CompileRunLog) -> EngineResult<()> {
        let mut run_logs = write(&self.run_logs, "run logs")?;
        run_logs.push(log);
        Ok(())
    }

    fn run_logs(&self) -> EngineResult<Vec<CompileRunLog>> {
        let run_logs = read(&self.run_logs, "run logs")?;
        Ok(run_logs.iter().rev().cloned().collect())
    }
}

impl RuleStore for MemoryStore {
    fn seed_rule(&self, rule: Rule) -> EngineResult<bool> {
        let mut rules = write(&self.rules, "rules")?;
        if rules.iter().any(|r| r.rule_code == rule.rule_code) {
            return Ok(false);
        }
        rules.push(rule);
        Ok(true)
    }

    fn rule(&self, rule_code: &str) -> EngineResult<Option<Rule>> {
        let rules = read(&self.rules, "rules")?;
        Ok(rules.iter().find(|r| r.rule_code == rule_code).cloned())
    }

    fn rules(&self, filter: &RuleFilter) -> EngineResult<Vec<Rule>> {
        let rules = read(&self.rules, "rules")?;
        let mut matching: Vec<Rule> = rules.iter().filter(|r| filter.matches(r)).cloned().collect();
        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.rule_code.cmp(&b.rule_code))
        });
        Ok(matching)
    }

    fn append_execution_log(&self, log: RuleExecutionLog) -> EngineResult<()> {
        let mut logs = write(&self.execution_logs, "execution logs")?;
        logs.push(log);
        Ok(())
    }

    fn execution_logs(&self, execution_id: Option<Uuid>) -> EngineResult<Vec<RuleExecutionLog>> {
        let logs = read(&self.execution_logs, "execution logs")?;
        Ok(logs
            .iter()
            .rev()
            .filter(|l| execution_id.is_none_or(|id| l.execution_id == id))
            .cloned()
            .collect())
    }
}
