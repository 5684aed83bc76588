//! Rule application against compiled award data.
//!
//! [`RuleEngine::apply`] looks a rule up by code, evaluates its stored
//! expression against the award's compiled summary and detail rows, and
//! appends exactly one execution log row whatever the outcome. Expected
//! failures (unknown rule, unknown award, malformed expression) surface
//! as an `ERROR` outcome rather than an `Err`, so every attempt is
//! auditable. Evaluation never mutates compiled data.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AwardDetail, AwardSummary, DetailRecord, DetailRecordKind, ExecutionStatus, RATE_TYPE_ADULT,
    RATE_TYPE_CASUAL, RuleApplicationOutcome, RuleExecutionLog, RuleType,
};
use crate::store::{AwardFilter, CompiledStore, DetailFilter, RuleFilter, RuleStore};

/// Evaluates catalog rules against compiled awards.
pub struct RuleEngine {
    rules: Arc<dyn RuleStore>,
    compiled: Arc<dyn CompiledStore>,
    config: EngineConfig,
}

/// Where one evaluation landed, before it is logged.
struct Evaluation {
    award_code: Option<String>,
    status: ExecutionStatus,
    result: Option<Value>,
    error_message: Option<String>,
}

impl Evaluation {
    fn error(award_code: Option<String>, message: String) -> Self {
        Evaluation {
            award_code,
            status: ExecutionStatus::Error,
            result: None,
            error_message: Some(message),
        }
    }
}

/// Outcome of one check over one award's compiled rows.
enum Verdict {
    Pass(Value),
    Fail { result: Value, message: String },
}

impl RuleEngine {
    /// Creates an engine over the given stores.
    pub fn new(
        rules: Arc<dyn RuleStore>,
        compiled: Arc<dyn CompiledStore>,
        config: EngineConfig,
    ) -> Self {
        RuleEngine {
            rules,
            compiled,
            config,
        }
    }

    /// Applies one rule to one compiled award.
    ///
    /// The rule's expression is re-read from the catalog on every call,
    /// so operator edits take effect immediately. One execution log row
    /// is appended per call; its `award_code` is populated only once the
    /// lookup got that far.
    ///
    /// # Errors
    ///
    /// Only storage faults propagate. Evaluation problems come back as
    /// an `ERROR`-status outcome.
    pub fn apply(&self, rule_code: &str, award_code: &str) -> EngineResult<RuleApplicationOutcome> {
        let execution_id = Uuid::new_v4();
        let executed_at = Utc::now();
        let timer = Instant::now();

        let evaluation = self.evaluate(rule_code, award_code)?;
        let duration_ms = timer.elapsed().as_millis() as u64;

        self.rules.append_execution_log(RuleExecutionLog {
            execution_id,
            rule_code: rule_code.to_string(),
            award_code: evaluation.award_code,
            execution_status: evaluation.status,
            result: evaluation.result,
            error_message: evaluation.error_message.clone(),
            duration_ms,
            executed_at,
        })?;

        match evaluation.status {
            ExecutionStatus::Success => {
                info!(rule_code, award_code, %execution_id, duration_ms, "Rule passed");
            }
            ExecutionStatus::Failure => {
                warn!(rule_code, award_code, %execution_id, duration_ms, "Rule failed");
            }
            ExecutionStatus::Error => {
                warn!(
                    rule_code,
                    award_code,
                    %execution_id,
                    error = evaluation.error_message.as_deref().unwrap_or(""),
                    "Rule could not be evaluated"
                );
            }
        }

        Ok(RuleApplicationOutcome {
            status: evaluation.status,
            execution_id,
            error_message: evaluation.error_message,
        })
    }

    /// Builds the JSON rule export: active rules in priority order plus
    /// generation metadata.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AwardNotFound`] when `award_code` names an
    /// award with no compiled summary.
    pub fn export(
        &self,
        award_code: Option<&str>,
        rule_type: Option<RuleType>,
    ) -> EngineResult<Value> {
        let award_code = match award_code {
            Some(code) => Some(self.compiled_summary(code)?.award_code),
            None => None,
        };

        let rules = self.rules.rules(&RuleFilter {
            rule_type,
            active: Some(true),
            ..RuleFilter::default()
        })?;

        Ok(json!({
            "generated_at": Utc::now(),
            "award_code": award_code,
            "rule_type": rule_type,
            "rule_count": rules.len(),
            "rules": rules,
        }))
    }

    fn evaluate(&self, rule_code: &str, award_code: &str) -> EngineResult<Evaluation> {
        let Some(rule) = self.rules.rule(rule_code)? else {
            return Ok(Evaluation::error(
                None,
                format!("Rule not found: {rule_code}"),
            ));
        };

        let summary = match self.compiled_summary(award_code) {
            Ok(summary) => summary,
            Err(EngineError::AwardNotFound { code }) => {
                return Ok(Evaluation::error(
                    Some(award_code.to_string()),
                    format!("Award not found: {code}"),
                ));
            }
            Err(err) => return Err(err),
        };

        let details = self.compiled.details(&DetailFilter {
            award_code: Some(summary.award_code.clone()),
            ..DetailFilter::default()
        })?;

        let verdict = match self.evaluate_expression(&rule.rule_expression, &summary, &details) {
            Ok(verdict) => verdict,
            Err(message) => return Ok(Evaluation::error(Some(summary.award_code), message)),
        };

        Ok(match verdict {
            Verdict::Pass(result) => Evaluation {
                award_code: Some(summary.award_code),
                status: ExecutionStatus::Success,
                result: Some(result),
                error_message: None,
            },
            Verdict::Fail { result, message } => Evaluation {
                award_code: Some(summary.award_code),
                status: ExecutionStatus::Failure,
                result: Some(result),
                error_message: Some(message),
            },
        })
    }

    fn compiled_summary(&self, award_code: &str) -> EngineResult<AwardSummary> {
        let filter = AwardFilter {
            code: Some(award_code.to_string()),
            ..AwardFilter::default()
        };
        self.compiled
            .summaries(&filter)?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::AwardNotFound {
                code: award_code.to_string(),
            })
    }

    fn evaluate_expression(
        &self,
        expression: &Value,
        summary: &AwardSummary,
        details: &[AwardDetail],
    ) -> Result<Verdict, String> {
        let check = expression
            .get("check")
            .and_then(Value::as_str)
            .ok_or_else(|| "rule expression has no 'check' discriminator".to_string())?;

        match check {
            "base_rate_minimum" => {
                let floor = decimal_param(expression, "floor")?;
                Ok(self.check_base_rate_minimum(floor, details))
            }
            "base_rate_positive" => Ok(check_base_rate_positive(details)),
            "operative_window_order" => Ok(check_operative_window_order(summary)),
            "classifications_present" => Ok(check_classifications_present(summary)),
            "allowance_amount_present" => Ok(check_allowance_amount_present(details)),
            "award_version_positive" => Ok(check_award_version_positive(summary)),
            "classification_hierarchy" => Ok(check_classification_hierarchy(details)),
            "rate_progression" => Ok(self.check_rate_progression(details)),
            "casual_rate_loaded" => Ok(check_casual_rate_loaded(details)),
            "all_purpose_clause_ref" => Ok(check_all_purpose_clause_ref(details)),
            "summary_detail_consistent" => Ok(check_summary_detail_consistent(summary, details)),
            "base_rate_spread" => {
                let max_ratio = decimal_param(expression, "max_ratio")?;
                Ok(self.check_base_rate_spread(max_ratio, details))
            }
            other => Err(format!("unknown check '{other}' in rule expression")),
        }
    }

    /// Every adult-coded base rate, hourly-equivalent, is at or above
    /// the floor. Junior and apprentice rows are percentage-scaled and
    /// exempt.
    fn check_base_rate_minimum(&self, floor: Decimal, details: &[AwardDetail]) -> Verdict {
        let mut checked = 0;
        let mut violations = Vec::new();

        for view in rate_views(details) {
            if !view.is_adult() {
                continue;
            }
            let Some(base_rate) = view.base_rate else {
                continue;
            };
            checked += 1;
            let hourly = self.config.hourly_equivalent(base_rate, view.unit);
            if hourly < floor {
                violations.push(json!({
                    "classification_fixed_id": view.fixed_id,
                    "hourly_rate": hourly,
                }));
            }
        }

        let failed = violations.len();
        let result = json!({"checked": checked, "floor": floor, "violations": violations});
        if failed == 0 {
            Verdict::Pass(result)
        } else {
            Verdict::Fail {
                result,
                message: format!("{failed} adult base rate(s) fall below the floor of {floor}"),
            }
        }
    }

    /// Minimum adult hourly base rate per level never decreases as the
    /// level rises. Unleveled rows are ignored.
    fn check_rate_progression(&self, details: &[AwardDetail]) -> Verdict {
        let mut by_level: Vec<(i32, Decimal)> = Vec::new();
        for view in rate_views(details) {
            let (Some(level), Some(base_rate)) = (view.level, view.base_rate) else {
                continue;
            };
            if !view.is_adult() {
                continue;
            }
            let hourly = self.config.hourly_equivalent(base_rate, view.unit);
            match by_level.iter_mut().find(|(l, _)| *l == level) {
                Some((_, min)) => {
                    if hourly < *min {
                        *min = hourly;
                    }
                }
                None => by_level.push((level, hourly)),
            }
        }
        by_level.sort_by_key(|(level, _)| *level);

        let mut violations = Vec::new();
        for pair in by_level.windows(2) {
            let (from_level, from_rate) = pair[0];
            let (to_level, to_rate) = pair[1];
            if to_rate < from_rate {
                violations.push(json!({
                    "from_level": from_level,
                    "from_rate": from_rate,
                    "to_level": to_level,
                    "to_rate": to_rate,
                }));
            }
        }

        let levels: Vec<Value> = by_level
            .iter()
            .map(|(level, rate)| json!({"level": level, "min_rate": rate}))
            .collect();
        let failed = violations.len();
        let result = json!({"levels": levels, "violations": violations});
        if failed == 0 {
            Verdict::Pass(result)
        } else {
            Verdict::Fail {
                result,
                message: format!(
                    "{failed} level transition(s) show a decreasing minimum adult rate"
                ),
            }
        }
    }

    /// Highest over lowest adult hourly base rate stays within the
    /// configured ratio. Fewer than two rates passes trivially.
    fn check_base_rate_spread(&self, max_ratio: Decimal, details: &[AwardDetail]) -> Verdict {
        let mut rates: Vec<Decimal> = Vec::new();
        for view in rate_views(details) {
            if !view.is_adult() {
                continue;
            }
            let Some(base_rate) = view.base_rate else {
                continue;
            };
            let hourly = self.config.hourly_equivalent(base_rate, view.unit);
            if hourly > Decimal::ZERO {
                rates.push(hourly);
            }
        }

        if rates.len() < 2 {
            return Verdict::Pass(json!({"checked": rates.len(), "max_ratio": max_ratio}));
        }

        let min = rates.iter().min().copied().unwrap_or(Decimal::ONE);
        let max = rates.iter().max().copied().unwrap_or(Decimal::ONE);
        let ratio = (max / min).round_dp(4);
        let result = json!({
            "min_rate": min,
            "max_rate": max,
            "ratio": ratio,
            "max_ratio": max_ratio,
        });
        if ratio <= max_ratio {
            Verdict::Pass(result)
        } else {
            Verdict::Fail {
                result,
                message: format!("base-rate spread {ratio} exceeds the bound {max_ratio}"),
            }
        }
    }
}

/// Borrowed view over one compiled pay-rate row.
struct RateView<'a> {
    fixed_id: i64,
    level: Option<i32>,
    rate_type_code: Option<&'a str>,
    unit: Option<&'a str>,
    base_rate: Option<Decimal>,
    calculated_rate: Option<Decimal>,
}

impl RateView<'_> {
    fn is_adult(&self) -> bool {
        match self.rate_type_code {
            None => true,
            Some(code) => code.eq_ignore_ascii_case(RATE_TYPE_ADULT),
        }
    }

    fn is_casual(&self) -> bool {
        self.rate_type_code
            .is_some_and(|code| code.eq_ignore_ascii_case(RATE_TYPE_CASUAL))
    }
}

fn rate_views(details: &[AwardDetail]) -> Vec<RateView<'_>> {
    details
        .iter()
        .filter_map(|detail| match &detail.record {
            DetailRecord::PayRate {
                classification_fixed_id,
                classification_level,
                employee_rate_type_code,
                base_rate_type,
                base_rate,
                calculated_rate,
                ..
            } => Some(RateView {
                fixed_id: *classification_fixed_id,
                level: *classification_level,
                rate_type_code: employee_rate_type_code.as_deref(),
                unit: base_rate_type.as_deref(),
                base_rate: *base_rate,
                calculated_rate: *calculated_rate,
            }),
            _ => None,
        })
        .collect()
}

fn decimal_param(expression: &Value, key: &str) -> Result<Decimal, String> {
    let value = expression
        .get(key)
        .ok_or_else(|| format!("rule expression is missing parameter '{key}'"))?;
    serde_json::from_value(value.clone())
        .map_err(|err| format!("rule expression parameter '{key}' is not a decimal: {err}"))
}

/// Every present base rate is strictly positive, whatever its coding.
fn check_base_rate_positive(details: &[AwardDetail]) -> Verdict {
    let mut checked = 0;
    let mut violations = Vec::new();

    for view in rate_views(details) {
        let Some(base_rate) = view.base_rate else {
            continue;
        };
        checked += 1;
        if base_rate <= Decimal::ZERO {
            violations.push(json!({
                "classification_fixed_id": view.fixed_id,
                "base_rate": base_rate,
            }));
        }
    }

    let failed = violations.len();
    let result = json!({"checked": checked, "violations": violations});
    if failed == 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: format!("{failed} base rate(s) are not positive"),
        }
    }
}

/// When both window dates are present, from does not fall after to.
fn check_operative_window_order(summary: &AwardSummary) -> Verdict {
    let result = json!({
        "operative_from": summary.operative_from,
        "operative_to": summary.operative_to,
    });
    match (summary.operative_from, summary.operative_to) {
        (Some(from), Some(to)) if from > to => Verdict::Fail {
            result,
            message: format!("operative window is inverted: {from} is after {to}"),
        },
        _ => Verdict::Pass(result),
    }
}

fn check_classifications_present(summary: &AwardSummary) -> Verdict {
    let total = summary.total_classifications;
    let result = json!({"total_classifications": total});
    if total > 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: "award has no classifications".to_string(),
        }
    }
}

/// Every allowance row carries an amount. A wage allowance with a
/// percentage rate but no dollar amount still passes, the amount can be
/// derived.
fn check_allowance_amount_present(details: &[AwardDetail]) -> Verdict {
    let mut checked = 0;
    let mut violations = Vec::new();

    for detail in details {
        match &detail.record {
            DetailRecord::ExpenseAllowance {
                expense_allowance_fixed_id,
                allowance_amount,
                ..
            } => {
                checked += 1;
                if allowance_amount.is_none() {
                    violations.push(json!({
                        "record_type": DetailRecordKind::ExpenseAllowance,
                        "fixed_id": expense_allowance_fixed_id,
                    }));
                }
            }
            DetailRecord::WageAllowance {
                wage_allowance_fixed_id,
                rate,
                allowance_amount,
                ..
            } => {
                checked += 1;
                if allowance_amount.is_none() && rate.is_none() {
                    violations.push(json!({
                        "record_type": DetailRecordKind::WageAllowance,
                        "fixed_id": wage_allowance_fixed_id,
                    }));
                }
            }
            _ => {}
        }
    }

    let failed = violations.len();
    let result = json!({"checked": checked, "violations": violations});
    if failed == 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: format!("{failed} allowance row(s) carry no amount"),
        }
    }
}

fn check_award_version_positive(summary: &AwardSummary) -> Verdict {
    let result = json!({"version_number": summary.version_number});
    match summary.version_number {
        Some(version) if version >= 1 => Verdict::Pass(result),
        Some(version) => Verdict::Fail {
            result,
            message: format!("award version number {version} is not positive"),
        },
        None => Verdict::Fail {
            result,
            message: "award has no version number".to_string(),
        },
    }
}

/// Distinct classification levels run 1..=max without gaps. Unleveled
/// classifications are ignored; an award with no levels passes.
fn check_classification_hierarchy(details: &[AwardDetail]) -> Verdict {
    let mut levels: Vec<i32> = details
        .iter()
        .filter_map(|detail| match &detail.record {
            DetailRecord::Classification {
                classification_level,
                ..
            } => *classification_level,
            _ => None,
        })
        .collect();
    levels.sort_unstable();
    levels.dedup();

    if levels.is_empty() {
        return Verdict::Pass(json!({"levels": levels, "missing": []}));
    }

    let max = levels[levels.len() - 1];
    let missing: Vec<i32> = (1..=max).filter(|l| !levels.contains(l)).collect();
    let result = json!({"levels": levels, "missing": missing});
    if missing.is_empty() {
        Verdict::Pass(result)
    } else {
        let listed = missing
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Verdict::Fail {
            result,
            message: format!("classification levels are not contiguous: missing level(s) {listed}"),
        }
    }
}

/// Every casual-coded rate row carries a calculated rate, and that rate
/// exceeds the base when a base is present.
fn check_casual_rate_loaded(details: &[AwardDetail]) -> Verdict {
    let mut checked = 0;
    let mut violations = Vec::new();

    for view in rate_views(details) {
        if !view.is_casual() {
            continue;
        }
        checked += 1;
        let loaded = match (view.calculated_rate, view.base_rate) {
            (Some(calculated), Some(base)) => calculated > base,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !loaded {
            violations.push(json!({
                "classification_fixed_id": view.fixed_id,
                "base_rate": view.base_rate,
                "calculated_rate": view.calculated_rate,
            }));
        }
    }

    let failed = violations.len();
    let result = json!({"checked": checked, "violations": violations});
    if failed == 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: format!("{failed} casual-coded row(s) lack a loaded calculated rate"),
        }
    }
}

/// Every all-purpose allowance cites the clause that makes it one.
fn check_all_purpose_clause_ref(details: &[AwardDetail]) -> Verdict {
    let mut checked = 0;
    let mut violations = Vec::new();

    for detail in details {
        let (kind, fixed_id, all_purpose, clauses) = match &detail.record {
            DetailRecord::ExpenseAllowance {
                expense_allowance_fixed_id,
                is_all_purpose,
                clauses,
                ..
            } => (
                DetailRecordKind::ExpenseAllowance,
                *expense_allowance_fixed_id,
                *is_all_purpose,
                clauses,
            ),
            DetailRecord::WageAllowance {
                wage_allowance_fixed_id,
                is_all_purpose,
                clauses,
                ..
            } => (
                DetailRecordKind::WageAllowance,
                *wage_allowance_fixed_id,
                *is_all_purpose,
                clauses,
            ),
            _ => continue,
        };
        if !all_purpose {
            continue;
        }
        checked += 1;
        let cited = clauses.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !cited {
            violations.push(json!({"record_type": kind, "fixed_id": fixed_id}));
        }
    }

    let failed = violations.len();
    let result = json!({"checked": checked, "violations": violations});
    if failed == 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: format!("{failed} all-purpose allowance(s) cite no clause"),
        }
    }
}

/// The summary's four row counts equal the compiled detail fan-out.
fn check_summary_detail_consistent(summary: &AwardSummary, details: &[AwardDetail]) -> Verdict {
    let count = |kind: DetailRecordKind| details.iter().filter(|d| d.record.kind() == kind).count();

    let pairs = [
        (
            DetailRecordKind::Classification,
            summary.total_classifications,
            count(DetailRecordKind::Classification),
        ),
        (
            DetailRecordKind::PayRate,
            summary.total_pay_rates,
            count(DetailRecordKind::PayRate),
        ),
        (
            DetailRecordKind::ExpenseAllowance,
            summary.total_expense_allowances,
            count(DetailRecordKind::ExpenseAllowance),
        ),
        (
            DetailRecordKind::WageAllowance,
            summary.total_wage_allowances,
            count(DetailRecordKind::WageAllowance),
        ),
    ];

    let mismatches: Vec<Value> = pairs
        .iter()
        .filter(|(_, summary_count, detail_count)| summary_count != detail_count)
        .map(|(kind, summary_count, detail_count)| {
            json!({
                "record_type": kind,
                "summary_count": summary_count,
                "detail_count": detail_count,
            })
        })
        .collect();

    let failed = mismatches.len();
    let result = json!({"mismatches": mismatches});
    if failed == 0 {
        Verdict::Pass(result)
    } else {
        Verdict::Fail {
            result,
            message: format!("{failed} record type(s) disagree between summary and detail"),
        }
    }
}
