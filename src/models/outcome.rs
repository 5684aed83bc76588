//! Structured outcomes of the compile/calculate/apply commands.
//!
//! Commands report expected failures through these types rather than
//! through errors: the caller always gets a status, counts, and an
//! optional message, and the store keeps the last committed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::ExecutionStatus;

/// Success or error of one compile/calculate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Every sub-unit in scope committed.
    Success,
    /// At least one sub-unit failed; committed sub-units stand.
    Error,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Success => write!(f, "SUCCESS"),
            OperationStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a summary compile run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCompileOutcome {
    /// Overall status of the run.
    pub status: OperationStatus,
    /// Summary rows written across all awards in scope.
    pub records_compiled: usize,
    /// Awards whose summary committed.
    pub awards_processed: usize,
    /// Awards whose sub-unit failed and was rolled back.
    pub awards_failed: usize,
    /// Diagnostic message when `status` is Error.
    pub error_message: Option<String>,
}

/// Result of a detail compile run, with the per-record-type fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailCompileOutcome {
    /// Overall status of the run.
    pub status: OperationStatus,
    /// Detail rows written across all awards in scope.
    pub total_records: usize,
    /// Awards whose detail rows committed.
    pub total_awards: usize,
    /// Award header rows scanned to drive the fan-out.
    pub base_records: usize,
    /// Detail rows tagged CLASSIFICATION.
    pub classification_records: usize,
    /// Detail rows tagged PAYRATE.
    pub pay_rate_records: usize,
    /// Detail rows tagged EXPENSE_ALLOWANCE.
    pub expense_records: usize,
    /// Detail rows tagged WAGE_ALLOWANCE.
    pub wage_records: usize,
    /// Diagnostic message when `status` is Error.
    pub error_message: Option<String>,
}

/// Result of a pay-rate calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    /// Overall status of the run.
    pub status: OperationStatus,
    /// Calculated rows written across all awards in scope.
    pub total_records_created: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
    /// Awards whose calculated rows committed.
    pub awards_processed: usize,
    /// Awards skipped because they already had active rows (resume).
    pub awards_skipped: usize,
    /// Classifications that produced combination rows.
    pub classifications_processed: usize,
    /// Rows with employment type full-time.
    pub full_time_rates: usize,
    /// Rows with employment type part-time.
    pub part_time_rates: usize,
    /// Rows with employment type casual.
    pub casual_rates: usize,
    /// Human-readable summary of the run, including failures.
    pub message: String,
}

/// Result of applying one rule to one award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleApplicationOutcome {
    /// Success, failure, or error of the evaluation.
    pub status: ExecutionStatus,
    /// Correlation id of the execution log row written for this call.
    pub execution_id: Uuid,
    /// Diagnostic message on failure or error.
    pub error_message: Option<String>,
}

/// Which command a run log row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompileOperation {
    /// A summary compile run.
    SummaryCompile,
    /// A detail compile run.
    DetailCompile,
    /// A pay-rate calculation run.
    RateCalculation,
}

impl std::fmt::Display for CompileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileOperation::SummaryCompile => write!(f, "SUMMARY_COMPILE"),
            CompileOperation::DetailCompile => write!(f, "DETAIL_COMPILE"),
            CompileOperation::RateCalculation => write!(f, "RATE_CALCULATION"),
        }
    }
}

/// One append-only audit row per compile/calculate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileRunLog {
    /// Opaque correlation id, fresh per run.
    pub run_id: Uuid,
    /// Which command ran.
    pub operation: CompileOperation,
    /// The award in scope; None for an all-awards run.
    pub award_code: Option<String>,
    /// Success or error of the run.
    pub status: OperationStatus,
    /// Output rows written by the run.
    pub records_written: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Diagnostic message when the run failed.
    pub error_message: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&OperationStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(
            serde_json::to_string(&OperationStatus::Error).unwrap(),
            "\"ERROR\""
        );
    }

    #[test]
    fn test_summary_outcome_round_trip() {
        let outcome = SummaryCompileOutcome {
            status: OperationStatus::Success,
            records_compiled: 3,
            awards_processed: 3,
            awards_failed: 0,
            error_message: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let deserialized: SummaryCompileOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, deserialized);
    }

    #[test]
    fn test_calculation_outcome_carries_category_counts() {
        let outcome = CalculationOutcome {
            status: OperationStatus::Success,
            total_records_created: 12,
            duration_seconds: 0.034,
            awards_processed: 1,
            awards_skipped: 0,
            classifications_processed: 3,
            full_time_rates: 4,
            part_time_rates: 4,
            casual_rates: 4,
            message: "calculated 12 rates for 1 award".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"full_time_rates\":4"));
        assert!(json.contains("\"casual_rates\":4"));
    }

    #[test]
    fn test_run_log_operation_tag() {
        let log = CompileRunLog {
            run_id: Uuid::new_v4(),
            operation: CompileOperation::RateCalculation,
            award_code: Some("MA000018".to_string()),
            status: OperationStatus::Error,
            records_written: 0,
            duration_ms: 12,
            error_message: Some("Award not found: MA000018".to_string()),
            started_at: Utc::now(),
        };
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"operation\":\"RATE_CALCULATION\""));

        let deserialized: CompileRunLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, deserialized);
    }
}
