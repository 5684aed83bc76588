//! Core data models for the award compilation and calculation engine.
//!
//! Staging rows are the read-only input; summary, detail, and calculated
//! rows are the compiled output; rules and the two log types cover the
//! catalog and its audit trail.

mod calculated;
mod detail;
mod outcome;
mod rule;
mod staging;
mod summary;

pub use calculated::{
    AgeCategory, ApprenticeYear, CalculatedPayRate, EmploymentType, JuniorBand, RateDayType,
    ShiftType,
};
pub use detail::{AwardDetail, DetailRecord, DetailRecordKind};
pub use outcome::{
    CalculationOutcome, CompileOperation, CompileRunLog, DetailCompileOutcome, OperationStatus,
    RuleApplicationOutcome, SummaryCompileOutcome,
};
pub use rule::{ExecutionStatus, Rule, RuleCategory, RuleExecutionLog, RuleType};
pub use staging::{
    RATE_TYPE_ADULT, RATE_TYPE_APPRENTICE, RATE_TYPE_CASUAL, RATE_TYPE_JUNIOR, StagedAward,
    StagedClassification, StagedExpenseAllowance, StagedPayRate, StagedPenalty,
    StagedWageAllowance, StagingDataset,
};
pub use summary::AwardSummary;
