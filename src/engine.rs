//! The engine facade: one struct owning the stores, locks, and config.
//!
//! [`Engine`] is what the API layer (and embedding callers) talk to. Each
//! command method builds the relevant compiler or evaluator over the
//! shared stores and runs it; read methods pass filters straight through
//! to the store. The engine itself is synchronous, callers decide the
//! threading.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{CalculationScope, RateCalculator};
use crate::compile::{DetailCompiler, SummaryCompiler};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    AwardDetail, AwardSummary, CalculationOutcome, CompileRunLog, DetailCompileOutcome, Rule,
    RuleApplicationOutcome, RuleExecutionLog, RuleType, StagingDataset, SummaryCompileOutcome,
};
use crate::rules::{RuleEngine, catalog};
use crate::store::{
    AwardFilter, AwardLockRegistry, CompiledStore, DetailFilter, MemoryStore, Page, RateFilter,
    RatePage, RuleFilter, RuleStore,
};

/// The compilation and calculation engine over one in-memory store.
pub struct Engine {
    store: Arc<MemoryStore>,
    locks: Arc<AwardLockRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with an empty store.
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            store: Arc::new(MemoryStore::new()),
            locks: Arc::new(AwardLockRegistry::new()),
            config,
        }
    }

    /// Replaces the staged dataset the pipeline reads from.
    pub fn load_staging(&self, dataset: StagingDataset) -> EngineResult<()> {
        let awards = dataset.awards.len();
        self.store.load_staging(dataset)?;
        info!(awards, "Staged dataset loaded");
        Ok(())
    }

    /// Compiles staged awards into summary rows.
    ///
    /// # Errors
    ///
    /// See [`SummaryCompiler::compile`].
    pub fn compile_awards_summary(
        &self,
        award_code: Option<&str>,
    ) -> EngineResult<SummaryCompileOutcome> {
        SummaryCompiler::new(
            self.store.clone(),
            self.store.clone(),
            self.locks.clone(),
            self.config.clone(),
        )
        .compile(award_code)
    }

    /// Compiles staged awards into per-relation detail rows.
    ///
    /// # Errors
    ///
    /// See [`DetailCompiler::compile`].
    pub fn compile_awards_detailed(
        &self,
        award_code: Option<&str>,
    ) -> EngineResult<DetailCompileOutcome> {
        DetailCompiler::new(self.store.clone(), self.store.clone(), self.locks.clone())
            .compile(award_code)
    }

    /// Calculates pay rates over the combination space.
    ///
    /// # Errors
    ///
    /// See [`RateCalculator::calculate`].
    pub fn calculate_all_pay_rates(
        &self,
        scope: &CalculationScope,
    ) -> EngineResult<CalculationOutcome> {
        RateCalculator::new(
            self.store.clone(),
            self.store.clone(),
            self.locks.clone(),
            self.config.clone(),
        )
        .calculate(scope)
    }

    /// Seeds the built-in rule catalog, inserting only missing rules.
    ///
    /// Returns true when at least one rule was inserted.
    ///
    /// # Errors
    ///
    /// Propagates storage faults.
    pub fn initialize_basic_rules(&self) -> EngineResult<bool> {
        let inserted = catalog::seed(self.store.as_ref(), &self.config.rules)?;
        if inserted > 0 {
            info!(inserted, "Rule catalog seeded");
        }
        Ok(inserted > 0)
    }

    /// Applies one catalog rule to one compiled award.
    ///
    /// # Errors
    ///
    /// See [`RuleEngine::apply`].
    pub fn apply_rule(
        &self,
        rule_code: &str,
        award_code: &str,
    ) -> EngineResult<RuleApplicationOutcome> {
        self.rule_engine().apply(rule_code, award_code)
    }

    /// Builds the JSON export of the active rule catalog.
    ///
    /// # Errors
    ///
    /// See [`RuleEngine::export`].
    pub fn award_rules_json(
        &self,
        award_code: Option<&str>,
        rule_type: Option<RuleType>,
    ) -> EngineResult<Value> {
        self.rule_engine().export(award_code, rule_type)
    }

    /// Compiled summary rows matching a filter.
    pub fn award_summaries(&self, filter: &AwardFilter) -> EngineResult<Vec<AwardSummary>> {
        self.store.summaries(filter)
    }

    /// Compiled detail rows matching a filter.
    pub fn award_details(&self, filter: &DetailFilter) -> EngineResult<Vec<AwardDetail>> {
        self.store.details(filter)
    }

    /// One page of calculated rows matching a filter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::InvalidFilter`] for an
    /// out-of-range page size.
    pub fn calculated_rates(&self, filter: &RateFilter, page: Page) -> EngineResult<RatePage> {
        self.store.rates(filter, page)
    }

    /// Catalog rules matching a filter, priority order.
    pub fn rules(&self, filter: &RuleFilter) -> EngineResult<Vec<Rule>> {
        self.store.rules(filter)
    }

    /// Rule execution log rows, optionally narrowed to one execution.
    pub fn rule_execution_logs(
        &self,
        execution_id: Option<Uuid>,
    ) -> EngineResult<Vec<RuleExecutionLog>> {
        self.store.execution_logs(execution_id)
    }

    /// Compile and calculation run log rows, most recent first.
    pub fn compile_run_logs(&self) -> EngineResult<Vec<CompileRunLog>> {
        self.store.run_logs()
    }

    fn rule_engine(&self) -> RuleEngine {
        RuleEngine::new(self.store.clone(), self.store.clone(), self.config.clone())
    }
}
