//! Awards detail compilation.
//!
//! Denormalizes the staged tables into one [`AwardDetail`] row per
//! (award, related record) pair. Each of the four relation types
//! contributes an independent row set tagged with its record kind; a
//! classification row never carries pay-rate fields and vice versa.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AwardDetail, CompileOperation, CompileRunLog, DetailCompileOutcome, DetailRecord,
    OperationStatus, StagedAward,
};
use crate::store::{AwardLockRegistry, CompiledStore, StagingStore};

use super::resolve_scope;

/// Per-record-kind row counts for one run.
#[derive(Debug, Default, Clone, Copy)]
struct FanOut {
    classifications: usize,
    pay_rates: usize,
    expenses: usize,
    wages: usize,
}

impl FanOut {
    fn total(&self) -> usize {
        self.classifications + self.pay_rates + self.expenses + self.wages
    }

    fn add(&mut self, other: FanOut) {
        self.classifications += other.classifications;
        self.pay_rates += other.pay_rates;
        self.expenses += other.expenses;
        self.wages += other.wages;
    }
}

/// Compiles staged award data into tagged detail rows.
pub struct DetailCompiler {
    staging: Arc<dyn StagingStore>,
    compiled: Arc<dyn CompiledStore>,
    locks: Arc<AwardLockRegistry>,
}

impl DetailCompiler {
    /// Creates a compiler over the given stores.
    pub fn new(
        staging: Arc<dyn StagingStore>,
        compiled: Arc<dyn CompiledStore>,
        locks: Arc<AwardLockRegistry>,
    ) -> Self {
        DetailCompiler {
            staging,
            compiled,
            locks,
        }
    }

    /// Compiles the scope into detail rows, one award per sub-unit.
    ///
    /// The detail rows for an award are built in full and committed with a
    /// single replace, so a failure anywhere leaves the award's previous
    /// rows in place and never a partial set.
    ///
    /// # Errors
    ///
    /// A scoped run returns [`EngineError::AwardNotFound`] for an unknown
    /// code and [`EngineError::CompileInFlight`] when another writer holds
    /// the award. Storage faults abort the whole run; everything else is
    /// reported through the outcome.
    pub fn compile(&self, award_code: Option<&str>) -> EngineResult<DetailCompileOutcome> {
        let scoped = award_code.is_some();
        let codes = resolve_scope(self.staging.as_ref(), award_code)?;

        let mut fan_out = FanOut::default();
        let mut total_awards = 0;
        let mut base_records = 0;
        let mut awards_failed = 0;
        let mut first_error: Option<String> = None;

        for code in &codes {
            match self.run_award(code) {
                Ok(award_fan_out) => {
                    total_awards += 1;
                    base_records += 1;
                    fan_out.add(award_fan_out);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err @ EngineError::CompileInFlight { .. }) if scoped => return Err(err),
                Err(err) => {
                    warn!(award_code = %code, error = %err, "Detail compile failed for award");
                    awards_failed += 1;
                    if first_error.is_none() {
                        first_error = Some(err.to_string());
                    }
                }
            }
        }

        info!(
            awards = total_awards,
            failed = awards_failed,
            records = fan_out.total(),
            "Detail compile completed"
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

        Ok(DetailCompileOutcome {
            status,
            total_records: fan_out.total(),
            total_awards,
            base_records,
            classification_records: fan_out.classifications,
            pay_rate_records: fan_out.pay_rates,
            expense_records: fan_out.expenses,
            wage_records: fan_out.wages,
            error_message,
        })
    }

    /// Runs one award sub-unit under its lock and appends the run log row.
    fn run_award(&self, code: &str) -> EngineResult<FanOut> {
        let _guard = self.locks.acquire(code)?;
        let started_at = Utc::now();
        let timer = Instant::now();

        let result = self.compile_award(code);
        let (status, records, error_message) = match &result {
            Ok(fan_out) => (OperationStatus::Success, fan_out.total(), None),
            Err(err) => (OperationStatus::Error, 0, Some(err.to_string())),
        };

        self.compiled.append_run_log(CompileRunLog {
            run_id: Uuid::new_v4(),
            operation: CompileOperation::DetailCompile,
            award_code: Some(code.to_string()),
            status,
            records_written: records,
            duration_ms: timer.elapsed().as_millis() as u64,
            error_message,
            started_at,
        })?;

        result
    }

    fn compile_award(&self, code: &str) -> EngineResult<FanOut> {
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

        let compiled_at = Utc::now();
        let capacity = classifications.len()
            + pay_rates.len()
            + expense_allowances.len()
            + wage_allowances.len();
        let mut rows = Vec::with_capacity(capacity);

        for row in &classifications {
            rows.push(detail_row(
                &award,
                compiled_at,
                DetailRecord::Classification {
                    classification_fixed_id: row.classification_fixed_id,
                    classification: row.classification.clone(),
                    parent_classification_name: row.parent_classification_name.clone(),
                    classification_level: row.classification_level,
                    clauses: row.clauses.clone(),
                    clause_description: row.clause_description.clone(),
                },
            ));
        }
        for row in &pay_rates {
            rows.push(detail_row(
                &award,
                compiled_at,
                DetailRecord::PayRate {
                    classification_fixed_id: row.classification_fixed_id,
                    classification: row.classification.clone(),
                    classification_level: row.classification_level,
                    employee_rate_type_code: row.employee_rate_type_code.clone(),
                    base_pay_rate_id: row.base_pay_rate_id.clone(),
                    base_rate_type: row.base_rate_type.clone(),
                    base_rate: row.base_rate,
                    calculated_rate_type: row.calculated_rate_type.clone(),
                    calculated_rate: row.calculated_rate,
                    rate_operative_from: row.operative_from,
                    rate_operative_to: row.operative_to,
                },
            ));
        }
        for row in &expense_allowances {
            rows.push(detail_row(
                &award,
                compiled_at,
                DetailRecord::ExpenseAllowance {
                    expense_allowance_fixed_id: row.expense_allowance_fixed_id,
                    allowance: row.allowance.clone(),
                    parent_allowance: row.parent_allowance.clone(),
                    is_all_purpose: row.is_all_purpose.unwrap_or(false),
                    allowance_amount: row.allowance_amount,
                    payment_frequency: row.payment_frequency.clone(),
                    clauses: row.clauses.clone(),
                },
            ));
        }
        for row in &wage_allowances {
            rows.push(detail_row(
                &award,
                compiled_at,
                DetailRecord::WageAllowance {
                    wage_allowance_fixed_id: row.wage_allowance_fixed_id,
                    allowance: row.allowance.clone(),
                    parent_allowance: row.parent_allowance.clone(),
                    is_all_purpose: row.is_all_purpose.unwrap_or(false),
                    rate: row.rate,
                    rate_unit: row.rate_unit.clone(),
                    allowance_amount: row.allowance_amount,
                    payment_frequency: row.payment_frequency.clone(),
                    clauses: row.clauses.clone(),
                },
            ));
        }

        let fan_out = FanOut {
            classifications: classifications.len(),
            pay_rates: pay_rates.len(),
            expenses: expense_allowances.len(),
            wages: wage_allowances.len(),
        };

        self.compiled.replace_details(code, rows)?;
        Ok(fan_out)
    }
}

fn detail_row(
    award: &StagedAward,
    compiled_at: DateTime<Utc>,
    record: DetailRecord,
) -> AwardDetail {
    AwardDetail {
        award_code: award.code.clone(),
        award_name: award.name.clone(),
        operative_from: award.award_operative_from,
        operative_to: award.award_operative_to,
        version_number: award.version_number,
        record,
        compiled_at,
    }
}
