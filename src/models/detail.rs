//! Compiled per-award detail rows.
//!
//! Each detail row pairs an award header with exactly one related staging
//! record, discriminated by `record_type`. The relation-specific fields
//! live inside the [`DetailRecord`] sum type, so a classification row can
//! never be misread as a pay-rate row with null rate fields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discriminant for the four detail record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailRecordKind {
    /// A classification definition row.
    #[serde(rename = "CLASSIFICATION")]
    Classification,
    /// A base/derived pay-rate row.
    #[serde(rename = "PAYRATE")]
    PayRate,
    /// An expense allowance row.
    #[serde(rename = "EXPENSE_ALLOWANCE")]
    ExpenseAllowance,
    /// A wage allowance row.
    #[serde(rename = "WAGE_ALLOWANCE")]
    WageAllowance,
}

impl std::fmt::Display for DetailRecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailRecordKind::Classification => write!(f, "CLASSIFICATION"),
            DetailRecordKind::PayRate => write!(f, "PAYRATE"),
            DetailRecordKind::ExpenseAllowance => write!(f, "EXPENSE_ALLOWANCE"),
            DetailRecordKind::WageAllowance => write!(f, "WAGE_ALLOWANCE"),
        }
    }
}

/// The relation-specific payload of a detail row.
///
/// Serializes with a `record_type` tag so consumers can dispatch on the
/// kind without probing which optional fields happen to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type")]
pub enum DetailRecord {
    /// Fields from a staged classification row.
    #[serde(rename = "CLASSIFICATION")]
    Classification {
        /// Stable source identifier of the classification.
        classification_fixed_id: i64,
        /// The classification's display name.
        classification: Option<String>,
        /// Name of the parent classification group.
        parent_classification_name: Option<String>,
        /// Numeric level within the award's hierarchy.
        classification_level: Option<i32>,
        /// Clause reference text.
        clauses: Option<String>,
        /// Description of the defining clause.
        clause_description: Option<String>,
    },
    /// Fields from a staged pay-rate row.
    #[serde(rename = "PAYRATE")]
    PayRate {
        /// The classification this rate belongs to.
        classification_fixed_id: i64,
        /// The classification's display name.
        classification: Option<String>,
        /// Numeric level within the award's hierarchy.
        classification_level: Option<i32>,
        /// Rate-type code ("AD", "JN", "AP", "CA").
        employee_rate_type_code: Option<String>,
        /// Source identifier of the base rate record.
        base_pay_rate_id: Option<String>,
        /// Unit of the base rate.
        base_rate_type: Option<String>,
        /// The unadjusted base rate.
        base_rate: Option<Decimal>,
        /// Unit of the derived rate.
        calculated_rate_type: Option<String>,
        /// The producer's pre-derived rate.
        calculated_rate: Option<Decimal>,
        /// Start of the rate row's own operative window.
        rate_operative_from: Option<NaiveDate>,
        /// End of the rate row's own operative window.
        rate_operative_to: Option<NaiveDate>,
    },
    /// Fields from a staged expense allowance row.
    #[serde(rename = "EXPENSE_ALLOWANCE")]
    ExpenseAllowance {
        /// Stable source identifier of the allowance.
        expense_allowance_fixed_id: i64,
        /// The allowance's display name.
        allowance: Option<String>,
        /// Name of the parent allowance group.
        parent_allowance: Option<String>,
        /// True when folded into the hourly rate for all purposes.
        #[serde(default)]
        is_all_purpose: bool,
        /// The allowance amount.
        allowance_amount: Option<Decimal>,
        /// Payment frequency.
        payment_frequency: Option<String>,
        /// Clause reference text.
        clauses: Option<String>,
    },
    /// Fields from a staged wage allowance row.
    #[serde(rename = "WAGE_ALLOWANCE")]
    WageAllowance {
        /// Stable source identifier of the allowance.
        wage_allowance_fixed_id: i64,
        /// The allowance's display name.
        allowance: Option<String>,
        /// Name of the parent allowance group.
        parent_allowance: Option<String>,
        /// True when folded into the hourly rate for all purposes.
        #[serde(default)]
        is_all_purpose: bool,
        /// Percentage-of-standard-rate expression of the allowance.
        rate: Option<Decimal>,
        /// Unit of `rate`.
        rate_unit: Option<String>,
        /// The resolved dollar amount.
        allowance_amount: Option<Decimal>,
        /// Payment frequency.
        payment_frequency: Option<String>,
        /// Clause reference text.
        clauses: Option<String>,
    },
}

impl DetailRecord {
    /// Returns the discriminant for this record.
    pub fn kind(&self) -> DetailRecordKind {
        match self {
            DetailRecord::Classification { .. } => DetailRecordKind::Classification,
            DetailRecord::PayRate { .. } => DetailRecordKind::PayRate,
            DetailRecord::ExpenseAllowance { .. } => DetailRecordKind::ExpenseAllowance,
            DetailRecord::WageAllowance { .. } => DetailRecordKind::WageAllowance,
        }
    }

    /// Returns the classification name, for records that carry one.
    pub fn classification_name(&self) -> Option<&str> {
        match self {
            DetailRecord::Classification { classification, .. }
            | DetailRecord::PayRate { classification, .. } => classification.as_deref(),
            _ => None,
        }
    }
}

/// One compiled detail row: award header plus one related record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardDetail {
    /// The award code.
    pub award_code: String,
    /// The award's display name.
    pub award_name: String,
    /// Start of the award's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of the award's operative window.
    pub operative_to: Option<NaiveDate>,
    /// Source version number of the award document.
    pub version_number: Option<i32>,
    /// The related record, tagged by kind.
    #[serde(flatten)]
    pub record: DetailRecord,
    /// When this detail row was compiled.
    pub compiled_at: DateTime<Utc>,
}
