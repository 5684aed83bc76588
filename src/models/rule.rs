//! Rule catalog and rule execution log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a rule is a single-condition check or a multi-record analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Evaluates one condition over individual rows.
    Simple,
    /// Correlates multiple rows or tables.
    Complex,
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleType::Simple => write!(f, "SIMPLE"),
            RuleType::Complex => write!(f, "COMPLEX"),
        }
    }
}

/// Functional grouping of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    /// Checks over base and derived pay rates.
    PayRate,
    /// Checks over expense and wage allowances.
    Allowance,
    /// Checks over the classification hierarchy.
    Classification,
    /// Cross-cutting award compliance checks.
    Compliance,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCategory::PayRate => write!(f, "PAY_RATE"),
            RuleCategory::Allowance => write!(f, "ALLOWANCE"),
            RuleCategory::Classification => write!(f, "CLASSIFICATION"),
            RuleCategory::Compliance => write!(f, "COMPLIANCE"),
        }
    }
}

/// One rule definition in the catalog.
///
/// The catalog is a registry: rules hold a serialized condition in
/// `rule_expression` and never execute anything themselves. Higher
/// `priority` rules are evaluated and reported first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable unique identifier (e.g. "BASE_RATE_MINIMUM").
    pub rule_code: String,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Simple or complex.
    pub rule_type: RuleType,
    /// Functional grouping.
    pub rule_category: RuleCategory,
    /// Evaluation/reporting priority, 0 to 1000, higher first.
    pub priority: u16,
    /// The serialized condition the application engine evaluates. A JSON
    /// object with a `check` discriminator plus check-specific parameters.
    pub rule_expression: serde_json::Value,
    /// What the rule verifies, for catalog listings.
    pub description: String,
    /// Inactive rules stay in the catalog but are skipped by exports.
    pub is_active: bool,
}

/// Outcome status of one rule execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The rule evaluated and the condition held.
    Success,
    /// The rule evaluated and the condition was violated.
    Failure,
    /// The rule could not be evaluated.
    Error,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "SUCCESS"),
            ExecutionStatus::Failure => write!(f, "FAILURE"),
            ExecutionStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One append-only audit row per rule application.
///
/// Written for every [`crate::engine::Engine::apply_rule`] call, whatever
/// the outcome, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleExecutionLog {
    /// Opaque correlation id, fresh per execution.
    pub execution_id: Uuid,
    /// The rule that was applied.
    pub rule_code: String,
    /// The award it was applied to, when the lookup got that far.
    pub award_code: Option<String>,
    /// Success, failure, or error.
    pub execution_status: ExecutionStatus,
    /// Structured result payload on success or failure.
    pub result: Option<serde_json::Value>,
    /// Diagnostic message on failure or error.
    pub error_message: Option<String>,
    /// Wall-clock evaluation time in milliseconds.
    pub duration_ms: u64,
    /// When the execution happened.
    pub executed_at: DateTime<Utc>,
}
