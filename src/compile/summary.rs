//! Awards summary compilation.
//!
//! Aggregates the staged tables into one [`AwardSummary`] row per award:
//! row counts, base-rate min/max/avg, and the operative window. The
//! summary table is replaced per award on every run, never patched.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AwardSummary, CompileOperation, CompileRunLog, OperationStatus, SummaryCompileOutcome,
};
use crate::store::{AwardLockRegistry, CompiledStore, StagingStore};

use super::resolve_scope;

/// Compiles staged award data into summary rows.
pub struct SummaryCompiler {
    staging: Arc<dyn StagingStore>,
    compiled: Arc<dyn CompiledStore>,
    locks: Arc<AwardLockRegistry>,
    config: EngineConfig,
}

impl SummaryCompiler {
    /// Creates a compiler over the given stores.
    pub fn new(
        staging: Arc<dyn StagingStore>,
        compiled: Arc<dyn CompiledStore>,
        locks: Arc<AwardLockRegistry>,
        config: EngineConfig,
    ) -> Self {
        SummaryCompiler {
            staging,
            compiled,
            locks,
            config,
        }
    }

    /// Compiles the scope into summary rows, one award per sub-unit.
    ///
    /// `award_code = None` compiles every staged award; each award commits
    /// independently, so one failed award does not discard the rest. A
    /// failed sub-unit leaves that award's previous summary in place.
    ///
    /// # Errors
    ///
    /// A scoped run returns [`EngineError::AwardNotFound`] for an unknown
    /// code and [`EngineError::CompileInFlight`] when another writer holds
    /// the award, both before any write. Storage faults abort the whole
    /// run; everything else is reported through the outcome.
    pub fn compile(&self, award_code: Option<&str>) -> EngineResult<SummaryCompileOutcome> {
        let scoped = award_code.is_some();
        let codes = resolve_scope(self.staging.as_ref(), award_code)?;

        let mut records_compiled = 0;
        let mut awards_processed = 0;
        let mut awards_failed = 0;
        let mut first_error: Option<String> = None;

        for code in &codes {
            match self.run_award(code) {
                Ok(records) => {
                    awards_processed += 1;
                    records_compiled += records;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err @ EngineError::CompileInFlight { .. }) if scoped => return Err(err),
                Err(err) => {
                    warn!(award_code = %code, error = %err, "Summary compile failed for award");
                    awards_failed += 1;
                    if first_error.is_none() {
                        first_error = Some(err.to_string());
                    }
                }
            }
        }

        info!(
            awards = awards_processed,
            failed = awards_failed,
            records = records_compiled,
            "Summary compile completed"
        );

        let status = if awards_failed == 0 {
            OperationStatus::Success
        } else {
            OperationStatus::Error
        };
        let error_message = first_error.map(|msg| {
            if codes.len() > 1 {
                format!(
                    "{awards_failed} of {} award(s) failed; first error: {msg}",
                    codes.len()
                )
            } else {
                msg
            }
        });

        Ok(SummaryCompileOutcome {
            status,
            records_compiled,
            awards_processed,
            awards_failed,
            error_message,
        })
    }

    /// Runs one award sub-unit under its lock and appends the run log row.
    fn run_award(&self, code: &str) -> EngineResult<usize> {
        let _guard = self.locks.acquire(code)?;
        let started_at = Utc::now();
        let timer = Instant::now();

        let result = self.compile_award(code);
        let (status, records, error_message) = match &result {
            Ok(records) => (OperationStatus::Success, *records, None),
            Err(err) => (OperationStatus::Error, 0, Some(err.to_string())),
        };

        self.compiled.append_run_log(CompileRunLog {
            run_id: Uuid::new_v4(),
            operation: CompileOperation::SummaryCompile,
            award_code: Some(code.to_string()),
            status,
            records_written: records,
            duration_ms: timer.elapsed().as_millis() as u64,
            error_message,
            started_at,
        })?;

        result
    }

    fn compile_award(&self, code: &str) -> EngineResult<usize> {
        let summary = self.build_summary(code)?;
        self.compiled.replace_summary(code, vec![summary])?;
        Ok(1)
    }

    fn build_summary(&self, code: &str) -> EngineResult<AwardSummary> {
        let award = self
            .staging
            .award(code)?
            .ok_or_else(|| EngineError::AwardNotFound {
                code: code.to_string(),
            })?;
        let classifications = self.staging.classifications(code)?;
        let pay_rates = self.staging.pay_rates(code)?;
        let expense_allowances = self.staging.expense_allowances(code)?;
        let wage_allowances = self.staging.wage_allowances(code)?;

        let rates: Vec<Decimal> = pay_rates.iter().filter_map(|r| r.base_rate).collect();
        let min_base_rate = rates.iter().min().copied();
        let max_base_rate = rates.iter().max().copied();
        let avg_base_rate = if rates.is_empty() {
            None
        } else {
            let sum: Decimal = rates.iter().copied().sum();
            Some((sum / Decimal::from(rates.len() as u64)).round_dp(self.config.engine.rate_scale))
        };

        let today = Utc::now().date_naive();
        let is_active = award.award_operative_from.is_none_or(|d| d <= today)
            && award.award_operative_to.is_none_or(|d| d >= today);

        Ok(AwardSummary {
            award_code: award.code.clone(),
            award_name: award.name.clone(),
            industry: award.industry.clone(),
            total_classifications: classifications.len(),
            total_pay_rates: pay_rates.len(),
            total_expense_allowances: expense_allowances.len(),
            total_wage_allowances: wage_allowances.len(),
            min_base_rate,
            max_base_rate,
            avg_base_rate,
            operative_from: award.award_operative_from,
            operative_to: award.award_operative_to,
            version_number: award.version_number,
            published_year: award.published_year,
            is_custom: award.is_custom,
            is_active,
            compiled_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StagedAward, StagedClassification, StagedPayRate, StagingDataset};
    use crate::store::{AwardFilter, MemoryStore};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn staged_award(award_id: i64, code: &str) -> StagedAward {
        StagedAward {
            award_id,
            award_fixed_id: 1000 + award_id,
            code: code.to_string(),
            name: format!("{code} Test Award"),
            industry: Some("Testing".to_string()),
            award_operative_from: Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
            award_operative_to: None,
            version_number: Some(1),
            published_year: Some(2024),
            is_custom: false,
        }
    }

    fn staged_classification(fixed_id: i64, code: &str, level: i32) -> StagedClassification {
        StagedClassification {
            classification_fixed_id: fixed_id,
            award_code: code.to_string(),
            clause_fixed_id: None,
            clauses: Some("14.2".to_string()),
            clause_description: None,
            parent_classification_name: None,
            classification: Some(format!("Level {level}")),
            classification_level: Some(level),
            operative_from: None,
            operative_to: None,
            version_number: Some(1),
        }
    }

    fn staged_rate(fixed_id: i64, code: &str, rate: &str) -> StagedPayRate {
        StagedPayRate {
            classification_fixed_id: fixed_id,
            award_code: code.to_string(),
            base_pay_rate_id: Some(format!("BR{fixed_id}")),
            base_rate_type: Some("Hourly".to_string()),
            base_rate: Some(dec(rate)),
            calculated_pay_rate_id: None,
            calculated_rate_type: None,
            calculated_rate: None,
            parent_classification_name: None,
            classification: Some(format!("Classification {fixed_id}")),
            classification_level: Some(1),
            employee_rate_type_code: Some("AD".to_string()),
            operative_from: None,
            operative_to: None,
            version_number: Some(1),
        }
    }

    fn compiler_over(store: &Arc<MemoryStore>, locks: Arc<AwardLockRegistry>) -> SummaryCompiler {
        SummaryCompiler::new(
            store.clone(),
            store.clone(),
            locks,
            EngineConfig::default(),
        )
    }

    fn store_with(dataset: StagingDataset) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.load_staging(dataset).unwrap();
        store
    }

    fn two_award_dataset() -> StagingDataset {
        StagingDataset {
            awards: vec![staged_award(1, "MA000018"), staged_award(2, "MA000120")],
            classifications: vec![
                staged_classification(101, "MA000018", 1),
                staged_classification(102, "MA000018", 2),
                staged_classification(201, "MA000120", 1),
            ],
            pay_rates: vec![
                staged_rate(101, "MA000018", "20.00"),
                staged_rate(102, "MA000018", "30.00"),
                staged_rate(201, "MA000120", "27.10"),
            ],
            ..StagingDataset::default()
        }
    }

    #[test]
    fn test_compile_single_award_counts_and_stats() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        let outcome = compiler.compile(Some("MA000018")).unwrap();
        assert_eq!(outcome.status, OperationStatus::Success);
        assert_eq!(outcome.records_compiled, 1);
        assert_eq!(outcome.awards_processed, 1);

        let summaries = store.summaries(&AwardFilter::default()).unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.award_code, "MA000018");
        assert_eq!(summary.total_classifications, 2);
        assert_eq!(summary.total_pay_rates, 2);
        assert_eq!(summary.min_base_rate, Some(dec("20.00")));
        assert_eq!(summary.max_base_rate, Some(dec("30.00")));
        assert_eq!(summary.avg_base_rate, Some(dec("25.00")));
        assert!(summary.is_active);
    }

    #[test]
    fn test_compile_all_awards_aggregates() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        let outcome = compiler.compile(None).unwrap();
        assert_eq!(outcome.status, OperationStatus::Success);
        assert_eq!(outcome.awards_processed, 2);
        assert_eq!(outcome.records_compiled, 2);
        assert_eq!(outcome.awards_failed, 0);

        let summaries = store.summaries(&AwardFilter::default()).unwrap();
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        compiler.compile(Some("MA000018")).unwrap();
        let first = store
            .summaries(&AwardFilter {
                code: Some("MA000018".to_string()),
                ..AwardFilter::default()
            })
            .unwrap();

        compiler.compile(Some("MA000018")).unwrap();
        let second = store
            .summaries(&AwardFilter {
                code: Some("MA000018".to_string()),
                ..AwardFilter::default()
            })
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].total_classifications, second[0].total_classifications);
        assert_eq!(first[0].total_pay_rates, second[0].total_pay_rates);
        assert_eq!(first[0].min_base_rate, second[0].min_base_rate);
        assert_eq!(first[0].max_base_rate, second[0].max_base_rate);
        assert_eq!(first[0].avg_base_rate, second[0].avg_base_rate);
    }

    #[test]
    fn test_compile_scope_isolation() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        compiler.compile(None).unwrap();
        let before = store
            .summaries(&AwardFilter {
                code: Some("MA000120".to_string()),
                ..AwardFilter::default()
            })
            .unwrap();

        compiler.compile(Some("MA000018")).unwrap();
        let after = store
            .summaries(&AwardFilter {
                code: Some("MA000120".to_string()),
                ..AwardFilter::default()
            })
            .unwrap();

        // The other award's row is byte-for-byte untouched, including its
        // compile timestamp.
        assert_eq!(before, after);
    }

    #[test]
    fn test_unknown_award_rejected_before_any_write() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        let err = compiler.compile(Some("MA999999")).unwrap_err();
        assert!(matches!(err, EngineError::AwardNotFound { .. }));
        assert!(store.summaries(&AwardFilter::default()).unwrap().is_empty());
        assert!(store.run_logs().unwrap().is_empty());
    }

    #[test]
    fn test_in_flight_award_rejected() {
        let store = store_with(two_award_dataset());
        let locks = Arc::new(AwardLockRegistry::new());
        let compiler = compiler_over(&store, locks.clone());

        let _held = locks.acquire("MA000018").unwrap();
        let err = compiler.compile(Some("MA000018")).unwrap_err();
        assert!(matches!(err, EngineError::CompileInFlight { .. }));
    }

    #[test]
    fn test_all_awards_run_continues_past_locked_award() {
        let store = store_with(two_award_dataset());
        let locks = Arc::new(AwardLockRegistry::new());
        let compiler = compiler_over(&store, locks.clone());

        let _held = locks.acquire("MA000018").unwrap();
        let outcome = compiler.compile(None).unwrap();

        assert_eq!(outcome.status, OperationStatus::Error);
        assert_eq!(outcome.awards_processed, 1);
        assert_eq!(outcome.awards_failed, 1);
        let message = outcome.error_message.unwrap();
        assert!(message.contains("1 of 2"), "unexpected message: {message}");
    }

    #[test]
    fn test_each_sub_unit_appends_a_run_log() {
        let store = store_with(two_award_dataset());
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        compiler.compile(None).unwrap();
        let logs = store.run_logs().unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs
            .iter()
            .all(|l| l.operation == CompileOperation::SummaryCompile));
        assert!(logs.iter().all(|l| l.status == OperationStatus::Success));
        assert_ne!(logs[0].run_id, logs[1].run_id);
    }

    #[test]
    fn test_award_without_rates_has_no_stats() {
        let dataset = StagingDataset {
            awards: vec![staged_award(1, "MA000018")],
            classifications: vec![staged_classification(101, "MA000018", 1)],
            ..StagingDataset::default()
        };
        let store = store_with(dataset);
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        compiler.compile(Some("MA000018")).unwrap();
        let summaries = store.summaries(&AwardFilter::default()).unwrap();
        assert_eq!(summaries[0].min_base_rate, None);
        assert_eq!(summaries[0].avg_base_rate, None);
        assert_eq!(summaries[0].total_pay_rates, 0);
    }

    #[test]
    fn test_lapsed_operative_window_is_inactive() {
        let mut award = staged_award(1, "MA000018");
        award.award_operative_to = Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let dataset = StagingDataset {
            awards: vec![award],
            ..StagingDataset::default()
        };
        let store = store_with(dataset);
        let compiler = compiler_over(&store, Arc::new(AwardLockRegistry::new()));

        compiler.compile(Some("MA000018")).unwrap();
        let summaries = store.summaries(&AwardFilter::default()).unwrap();
        assert!(!summaries[0].is_active);
    }
}
