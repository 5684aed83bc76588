//! Pay-rate calculation across the combination space.
//!
//! For every classification of every award in scope, the calculator
//! enumerates the award's condition axes and runs the staged pipeline
//! once per combination. Awards commit independently: each award's rows
//! are replaced in one store call under its award lock, and every award
//! that runs appends a run log row. A failed award leaves its previous
//! calculated rows in place.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::compile::resolve_scope;
use crate::config::{EngineConfig, LoadingInteraction};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AgeCategory, CalculatedPayRate, CalculationOutcome, CompileOperation, CompileRunLog,
    EmploymentType, OperationStatus, RATE_TYPE_ADULT, RATE_TYPE_APPRENTICE, RATE_TYPE_CASUAL,
    RATE_TYPE_JUNIOR, RateDayType, ShiftType, StagedAward, StagedClassification,
    StagedExpenseAllowance, StagedPayRate, StagedPenalty, StagedWageAllowance,
};
use crate::store::{AwardLockRegistry, CompiledStore, StagingStore};

use super::axes::{AwardAxes, day_type_of, shift_type_of};
use super::stages::{RateComputation, allowance_hourly_equivalent};

/// What one calculation run covers.
#[derive(Debug, Clone, Default)]
pub struct CalculationScope {
    /// Restrict to one award; `None` calculates every staged award.
    pub award_code: Option<String>,
    /// Restrict to one classification fixed id within each award in
    /// scope. The award's active rows are still rebuilt as a whole, so a
    /// filtered run holds only the filtered classification's rows.
    pub classification: Option<i64>,
    /// Skip awards that already have active calculated rows.
    pub resume: bool,
}

/// Enumerates combinations and produces calculated pay-rate rows.
pub struct RateCalculator {
    staging: Arc<dyn StagingStore>,
    compiled: Arc<dyn CompiledStore>,
    locks: Arc<AwardLockRegistry>,
    config: EngineConfig,
}

/// Row counts accumulated over one award (or a whole run).
#[derive(Debug, Default, Clone, Copy)]
struct AwardRunStats {
    records: usize,
    classifications: usize,
    full_time: usize,
    part_time: usize,
    casual: usize,
}

impl AwardRunStats {
    fn merge(&mut self, other: AwardRunStats) {
        self.records += other.records;
        self.classifications += other.classifications;
        self.full_time += other.full_time;
        self.part_time += other.part_time;
        self.casual += other.casual;
    }
}

/// The adult base rate a classification's combinations start from.
struct BaseRate {
    hourly: Decimal,
    unit: String,
    level: Option<i32>,
    operative_from: Option<NaiveDate>,
    operative_to: Option<NaiveDate>,
}

/// One all-purpose allowance with a derivable hourly equivalent.
struct FoldedAllowance {
    fixed_id: i64,
    name: String,
    hourly: Decimal,
}

/// The award's allowances split into folded and listed-only.
struct AllowanceSplit {
    folded: Vec<FoldedAllowance>,
    folded_total: Decimal,
    other_ids: Vec<i64>,
    other_total: Decimal,
}

impl AllowanceSplit {
    /// Splits the staged allowances. All-purpose rows with an hourly
    /// equivalent fold into the rate; everything else is listed on the
    /// row without affecting it. Event-based frequencies never fold.
    fn build(
        config: &EngineConfig,
        expense_allowances: &[StagedExpenseAllowance],
        wage_allowances: &[StagedWageAllowance],
    ) -> AllowanceSplit {
        let mut split = AllowanceSplit {
            folded: Vec::new(),
            folded_total: Decimal::ZERO,
            other_ids: Vec::new(),
            other_total: Decimal::ZERO,
        };

        for row in expense_allowances {
            split.add(
                config,
                row.expense_allowance_fixed_id,
                row.allowance.as_deref(),
                row.is_all_purpose.unwrap_or(false),
                row.allowance_amount,
                row.payment_frequency.as_deref(),
            );
        }
        for row in wage_allowances {
            split.add(
                config,
                row.wage_allowance_fixed_id,
                row.allowance.as_deref(),
                row.is_all_purpose.unwrap_or(false),
                row.allowance_amount,
                row.payment_frequency.as_deref(),
            );
        }

        split.folded.sort_by_key(|a| a.fixed_id);
        split.other_ids.sort_unstable();
        split.folded_total = split.folded.iter().map(|a| a.hourly).sum();
        split
    }

    fn add(
        &mut self,
        config: &EngineConfig,
        fixed_id: i64,
        name: Option<&str>,
        all_purpose: bool,
        amount: Option<Decimal>,
        frequency: Option<&str>,
    ) {
        let hourly = amount.and_then(|a| allowance_hourly_equivalent(config, a, frequency));
        match (all_purpose, hourly) {
            (true, Some(hourly)) => self.folded.push(FoldedAllowance {
                fixed_id,
                name: name
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("allowance {fixed_id}")),
                hourly,
            }),
            _ => {
                self.other_ids.push(fixed_id);
                self.other_total += hourly.unwrap_or(Decimal::ZERO);
            }
        }
    }
}

impl RateCalculator {
    /// Creates a calculator over the given stores.
    pub fn new(
        staging: Arc<dyn StagingStore>,
        compiled: Arc<dyn CompiledStore>,
        locks: Arc<AwardLockRegistry>,
        config: EngineConfig,
    ) -> Self {
        RateCalculator {
            staging,
            compiled,
            locks,
            config,
        }
    }

    /// Calculates the scope, one award per committed sub-unit.
    ///
    /// With `resume` set, awards that already hold active calculated
    /// rows are skipped without running (and without a run log row).
    ///
    /// # Errors
    ///
    /// A scoped run returns [`EngineError::AwardNotFound`] for an unknown
    /// code and [`EngineError::CompileInFlight`] when another writer holds
    /// the award, both before any write. Storage faults abort the whole
    /// run; everything else is reported through the outcome.
    pub fn calculate(&self, scope: &CalculationScope) -> EngineResult<CalculationOutcome> {
        let scoped = scope.award_code.is_some();
        let codes = resolve_scope(self.staging.as_ref(), scope.award_code.as_deref())?;
        let timer = Instant::now();

        let mut totals = AwardRunStats::default();
        let mut awards_processed = 0;
        let mut awards_skipped = 0;
        let mut awards_failed = 0;
        let mut first_error: Option<String> = None;

        for code in &codes {
            if scope.resume && self.compiled.has_active_rates(code)? {
                info!(award_code = %code, "Skipping award with active calculated rates");
                awards_skipped += 1;
                continue;
            }
            match self.run_award(code, scope.classification) {
                Ok(stats) => {
                    awards_processed += 1;
                    totals.merge(stats);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err @ EngineError::CompileInFlight { .. }) if scoped => return Err(err),
                Err(err) => {
                    warn!(award_code = %code, error = %err, "Rate calculation failed for award");
                    awards_failed += 1;
                    if first_error.is_none() {
                        first_error = Some(err.to_string());
                    }
                }
            }
        }

        info!(
            awards = awards_processed,
            skipped = awards_skipped,
            failed = awards_failed,
            records = totals.records,
            "Rate calculation completed"
        );

        let status = if awards_failed == 0 {
            OperationStatus::Success
        } else {
            OperationStatus::Error
        };
        let message = match first_error {
            None => format!(
                "calculated {} rate(s) for {} award(s)",
                totals.records, awards_processed
            ),
            Some(msg) if codes.len() > 1 => format!(
                "{awards_failed} of {} award(s) failed; first error: {msg}",
                codes.len()
            ),
            Some(msg) => msg,
        };

        Ok(CalculationOutcome {
            status,
            total_records_created: totals.records,
            duration_seconds: timer.elapsed().as_secs_f64(),
            awards_processed,
            awards_skipped,
            classifications_processed: totals.classifications,
            full_time_rates: totals.full_time,
            part_time_rates: totals.part_time,
            casual_rates: totals.casual,
            message,
        })
    }

    /// Runs one award sub-unit under its lock and appends the run log row.
    fn run_award(&self, code: &str, classification: Option<i64>) -> EngineResult<AwardRunStats> {
        let _guard = self.locks.acquire(code)?;
        let started_at = Utc::now();
        let timer = Instant::now();

        let result = self.calculate_award(code, classification);
        let (status, records, error_message) = match &result {
            Ok(stats) => (OperationStatus::Success, stats.records, None),
            Err(err) => (OperationStatus::Error, 0, Some(err.to_string())),
        };

        self.compiled.append_run_log(CompileRunLog {
            run_id: Uuid::new_v4(),
            operation: CompileOperation::RateCalculation,
            award_code: Some(code.to_string()),
            status,
            records_written: records,
            duration_ms: timer.elapsed().as_millis() as u64,
            error_message,
            started_at,
        })?;

        result
    }

    fn calculate_award(
        &self,
        code: &str,
        classification: Option<i64>,
    ) -> EngineResult<AwardRunStats> {
        let award = self
            .staging
            .award(code)?
            .ok_or_else(|| EngineError::AwardNotFound {
                code: code.to_string(),
            })?;
        let mut classifications = self.staging.classifications(code)?;
        if let Some(fixed_id) = classification {
            classifications.retain(|c| c.classification_fixed_id == fixed_id);
        }
        let pay_rates = self.staging.pay_rates(code)?;
        let penalties = self.staging.penalties(code)?;
        let expense_allowances = self.staging.expense_allowances(code)?;
        let wage_allowances = self.staging.wage_allowances(code)?;

        let axes = AwardAxes::derive(&self.config, &award.code, &pay_rates, &penalties);
        let allowances = AllowanceSplit::build(&self.config, &expense_allowances, &wage_allowances);

        let mut stats = AwardRunStats::default();
        let mut rows = Vec::new();
        let compiled_at = Utc::now();

        for classification in &classifications {
            let Some(base) = base_rate_for(&self.config, classification, &pay_rates) else {
                warn!(
                    award_code = %award.code,
                    classification_fixed_id = classification.classification_fixed_id,
                    "No usable adult base rate; skipping classification"
                );
                continue;
            };
            stats.classifications += 1;

            for &employment_type in &axes.employment_types {
                for &day_type in &axes.day_types {
                    for &shift_type in &axes.shift_types {
                        for &age_category in &axes.age_categories {
                            rows.push(self.calculate_row(
                                &award,
                                classification,
                                &base,
                                &penalties,
                                &allowances,
                                employment_type,
                                day_type,
                                shift_type,
                                age_category,
                                compiled_at,
                            ));
                            stats.records += 1;
                            match employment_type {
                                EmploymentType::FullTime => stats.full_time += 1,
                                EmploymentType::PartTime => stats.part_time += 1,
                                EmploymentType::Casual => stats.casual += 1,
                            }
                        }
                    }
                }
            }
        }

        self.compiled.replace_rates(&award.code, rows)?;
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn calculate_row(
        &self,
        award: &StagedAward,
        classification: &StagedClassification,
        base: &BaseRate,
        penalties: &[StagedPenalty],
        allowances: &AllowanceSplit,
        employment_type: EmploymentType,
        day_type: RateDayType,
        shift_type: ShiftType,
        age_category: AgeCategory,
        compiled_at: chrono::DateTime<Utc>,
    ) -> CalculatedPayRate {
        let level = classification.classification_level.or(base.level);
        let mut computation =
            RateComputation::new(base.hourly, &base.unit, self.config.engine.rate_scale);

        let interaction = self.config.loading_interaction(&award.code);
        let casual_fires = employment_type == EmploymentType::Casual
            && (age_category == AgeCategory::Adult || interaction == LoadingInteraction::Stack);
        let mut casual_clause = None;
        if casual_fires {
            computation.apply_casual_loading(self.config.casual_loading(&award.code));
            casual_clause = self.config.casual_clause(&award.code);
        }

        let mut junior_clause = None;
        match age_category {
            AgeCategory::Adult => {}
            AgeCategory::Junior(band) => {
                computation.apply_age_percentage(age_category, self.config.junior_percentage(band));
                junior_clause = self.config.junior_clause(&award.code);
            }
            AgeCategory::Apprentice(year) => {
                computation
                    .apply_age_percentage(age_category, self.config.apprentice_percentage(year));
                junior_clause = self.config.junior_clause(&award.code);
            }
        }

        let mut penalty_clause = None;
        if let Some(penalty) =
            select_penalty(penalties, level, employment_type, age_category, day_type, shift_type)
        {
            if let Some(uplift) = penalty.rate {
                computation.apply_penalty_multiplier(&penalty.penalty_type, uplift);
                penalty_clause = penalty.clause_description.clone();
            } else if let Some(amount) = penalty.penalty_calculated_value {
                computation.apply_penalty_flat(&penalty.penalty_type, amount);
                penalty_clause = penalty.clause_description.clone();
            }
        }

        for allowance in &allowances.folded {
            computation.apply_allowance(&allowance.name, allowance.hourly);
        }

        let computed = computation.finish();

        CalculatedPayRate {
            award_code: award.code.clone(),
            classification: classification
                .classification
                .clone()
                .unwrap_or_else(|| {
                    format!("Classification {}", classification.classification_fixed_id)
                }),
            classification_fixed_id: classification.classification_fixed_id,
            classification_level: level,
            employment_type,
            day_type,
            shift_type,
            age_category,
            base_rate: base.hourly,
            base_rate_type: base.unit.clone(),
            casual_loading_applied: computed.casual_loading_applied,
            casual_loaded_rate: computed.casual_loaded_rate,
            junior_percentage_applied: computed.junior_percentage_applied,
            junior_adjusted_rate: computed.junior_adjusted_rate,
            apprentice_percentage_applied: computed.apprentice_percentage_applied,
            apprentice_adjusted_rate: computed.apprentice_adjusted_rate,
            penalty_type: computed.penalty_type,
            penalty_multiplier_applied: computed.penalty_multiplier_applied,
            penalty_flat_amount_applied: computed.penalty_flat_amount_applied,
            penalty_adjusted_rate: computed.penalty_adjusted_rate,
            applicable_allowance_ids: allowances.folded.iter().map(|a| a.fixed_id).collect(),
            applicable_allowance_total: allowances.folded_total,
            other_allowance_ids: allowances.other_ids.clone(),
            other_allowance_total: allowances.other_total,
            calculated_hourly_rate: computed.final_rate,
            calculation_steps: computed.steps,
            penalty_clause,
            casual_clause,
            junior_clause,
            effective_from: base.operative_from.or(award.award_operative_from),
            effective_to: base.operative_to.or(award.award_operative_to),
            is_active: true,
            compiled_at,
            compiled_by: self.config.engine.compiled_by.clone(),
        }
    }
}

/// Picks the classification's adult base-rate row and derives its hourly
/// rate. Hourly rows are preferred over weekly; a classification with no
/// adult-coded rate has no usable base.
fn base_rate_for(
    config: &EngineConfig,
    classification: &StagedClassification,
    pay_rates: &[StagedPayRate],
) -> Option<BaseRate> {
    let candidates: Vec<&StagedPayRate> = pay_rates
        .iter()
        .filter(|r| {
            r.classification_fixed_id == classification.classification_fixed_id
                && r.is_adult_coded()
                && r.base_rate.is_some()
        })
        .collect();

    let row = candidates
        .iter()
        .find(|r| {
            r.base_rate_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("hourly"))
        })
        .or_else(|| candidates.first())?;

    let staged = row.base_rate?;
    let unit = row
        .base_rate_type
        .clone()
        .unwrap_or_else(|| "Hourly".to_string());
    Some(BaseRate {
        hourly: config.hourly_equivalent(staged, row.base_rate_type.as_deref()),
        unit,
        level: row.classification_level,
        operative_from: row.operative_from,
        operative_to: row.operative_to,
    })
}

/// Picks the single most specific penalty for one combination.
///
/// A penalty is a candidate when every axis it pins matches the
/// combination and its rate-type restriction admits the employment type
/// and age category. Among candidates, a pinned classification level wins
/// first, then the number of pinned axes, then multiplicative over flat,
/// then the larger uplift; remaining ties keep staged order.
fn select_penalty<'a>(
    penalties: &'a [StagedPenalty],
    level: Option<i32>,
    employment_type: EmploymentType,
    age_category: AgeCategory,
    day_type: RateDayType,
    shift_type: ShiftType,
) -> Option<&'a StagedPenalty> {
    let mut candidates: Vec<(&StagedPenalty, (bool, u8, bool, Decimal))> = penalties
        .iter()
        .filter_map(|p| {
            if p.rate.is_none() && p.penalty_calculated_value.is_none() {
                return None;
            }
            let day = day_type_of(p);
            let shift = shift_type_of(p);
            // A penalty that classifies onto neither axis cannot be
            // attributed to a combination.
            if day.is_none() && shift.is_none() {
                return None;
            }
            if day.is_some_and(|d| d != day_type) {
                return None;
            }
            if shift.is_some_and(|s| s != shift_type) {
                return None;
            }
            if let Some(required) = p.classification_level {
                if level != Some(required) {
                    return None;
                }
            }
            if !rate_type_code_admits(
                p.employee_rate_type_code.as_deref(),
                employment_type,
                age_category,
            ) {
                return None;
            }
            let specificity = (
                p.classification_level.is_some(),
                day.is_some() as u8 + shift.is_some() as u8,
                p.is_multiplicative(),
                p.rate.unwrap_or(Decimal::ZERO),
            );
            Some((p, specificity))
        })
        .collect();

    candidates.sort_by(|(_, a), (_, b)| b.cmp(a));
    candidates.first().map(|(p, _)| *p)
}

/// Whether a penalty's rate-type restriction admits this combination.
fn rate_type_code_admits(
    code: Option<&str>,
    employment_type: EmploymentType,
    age_category: AgeCategory,
) -> bool {
    let Some(code) = code else {
        return true;
    };
    if code.eq_ignore_ascii_case(RATE_TYPE_CASUAL) {
        employment_type == EmploymentType::Casual
    } else if code.eq_ignore_ascii_case(RATE_TYPE_JUNIOR) {
        age_category.is_junior()
    } else if code.eq_ignore_ascii_case(RATE_TYPE_APPRENTICE) {
        age_category.is_apprentice()
    } else if code.eq_ignore_ascii_case(RATE_TYPE_ADULT) {
        age_category == AgeCategory::Adult
    } else {
        true
    }
}
