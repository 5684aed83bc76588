//! Staged award data rows, as produced by the upstream extraction pipeline.
//!
//! These structs mirror the staging tables column-for-column. The engine
//! never writes them; they are the read-only input to the summary/detail
//! compilers and the pay-rate calculator. Optional columns are optional in
//! the source data, not an error condition.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee rate-type code for an adult rate row.
pub const RATE_TYPE_ADULT: &str = "AD";
/// Employee rate-type code for a junior rate row.
pub const RATE_TYPE_JUNIOR: &str = "JN";
/// Employee rate-type code for an apprentice rate row.
pub const RATE_TYPE_APPRENTICE: &str = "AP";
/// Employee rate-type code for a casual-loaded rate row.
pub const RATE_TYPE_CASUAL: &str = "CA";

/// One staged award header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedAward {
    /// Surrogate key assigned by the staging producer.
    pub award_id: i64,
    /// Stable source-system identifier for the award.
    pub award_fixed_id: i64,
    /// The award code (e.g. "MA000018").
    pub code: String,
    /// The award's display name.
    pub name: String,
    /// Industry grouping, when the producer supplies one.
    pub industry: Option<String>,
    /// Start of the award's operative window.
    pub award_operative_from: Option<NaiveDate>,
    /// End of the award's operative window; open-ended when absent.
    pub award_operative_to: Option<NaiveDate>,
    /// Source version number of the award document.
    pub version_number: Option<i32>,
    /// Year the award version was published.
    pub published_year: Option<i32>,
    /// True for locally-defined awards not sourced from the public register.
    #[serde(default)]
    pub is_custom: bool,
}

/// One staged classification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedClassification {
    /// Stable source-system identifier for the classification.
    pub classification_fixed_id: i64,
    /// The owning award's code.
    pub award_code: String,
    /// Stable identifier of the defining clause.
    pub clause_fixed_id: Option<i64>,
    /// Clause reference text (e.g. "14.2(a)").
    pub clauses: Option<String>,
    /// Description of the defining clause.
    pub clause_description: Option<String>,
    /// Name of the parent classification group.
    pub parent_classification_name: Option<String>,
    /// The classification's display name.
    pub classification: Option<String>,
    /// Numeric level within the award's hierarchy.
    pub classification_level: Option<i32>,
    /// Start of this row's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of this row's operative window.
    pub operative_to: Option<NaiveDate>,
    /// Source version number.
    pub version_number: Option<i32>,
}

/// One staged pay-rate row, linking a classification to its base and
/// derived rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPayRate {
    /// The classification this rate belongs to.
    pub classification_fixed_id: i64,
    /// The owning award's code.
    pub award_code: String,
    /// Source identifier of the base rate record.
    pub base_pay_rate_id: Option<String>,
    /// Unit of the base rate ("Hourly" or "Weekly").
    pub base_rate_type: Option<String>,
    /// The unadjusted base rate in the unit named by `base_rate_type`.
    pub base_rate: Option<Decimal>,
    /// Source identifier of the derived rate record.
    pub calculated_pay_rate_id: Option<String>,
    /// Unit of the derived rate.
    pub calculated_rate_type: Option<String>,
    /// The producer's pre-derived rate (e.g. a casual-loaded hourly rate).
    pub calculated_rate: Option<Decimal>,
    /// Name of the parent classification group.
    pub parent_classification_name: Option<String>,
    /// The classification's display name.
    pub classification: Option<String>,
    /// Numeric level within the award's hierarchy.
    pub classification_level: Option<i32>,
    /// Rate-type code: "AD" adult, "JN" junior, "AP" apprentice, "CA" casual.
    pub employee_rate_type_code: Option<String>,
    /// Start of this row's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of this row's operative window.
    pub operative_to: Option<NaiveDate>,
    /// Source version number.
    pub version_number: Option<i32>,
}

impl StagedPayRate {
    /// Returns true if this row carries an adult rate.
    ///
    /// Rows without a rate-type code are treated as adult; the staging
    /// producer only codes the exceptional rows.
    pub fn is_adult_coded(&self) -> bool {
        match self.employee_rate_type_code.as_deref() {
            None => true,
            Some(code) => code.eq_ignore_ascii_case(RATE_TYPE_ADULT),
        }
    }

    /// Returns true if this row carries a junior rate.
    pub fn is_junior_coded(&self) -> bool {
        self.has_rate_type_code(RATE_TYPE_JUNIOR)
    }

    /// Returns true if this row carries an apprentice rate.
    pub fn is_apprentice_coded(&self) -> bool {
        self.has_rate_type_code(RATE_TYPE_APPRENTICE)
    }

    /// Returns true if this row carries a casual-loaded rate.
    pub fn is_casual_coded(&self) -> bool {
        self.has_rate_type_code(RATE_TYPE_CASUAL)
    }

    fn has_rate_type_code(&self, expected: &str) -> bool {
        self.employee_rate_type_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(expected))
    }
}

/// One staged expense allowance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedExpenseAllowance {
    /// Stable source-system identifier for the allowance.
    pub expense_allowance_fixed_id: i64,
    /// The owning award's code.
    pub award_code: String,
    /// Stable identifier of the defining clause.
    pub clause_fixed_id: Option<i64>,
    /// Clause reference text.
    pub clauses: Option<String>,
    /// Name of the parent allowance group.
    pub parent_allowance: Option<String>,
    /// The allowance's display name.
    pub allowance: Option<String>,
    /// True when the allowance is folded into the hourly rate for all
    /// purposes.
    pub is_all_purpose: Option<bool>,
    /// The allowance amount in the unit named by `payment_frequency`.
    pub allowance_amount: Option<Decimal>,
    /// Payment frequency ("Per hour", "Per week", "Per annum").
    pub payment_frequency: Option<String>,
    /// Start of this row's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of this row's operative window.
    pub operative_to: Option<NaiveDate>,
}

/// One staged wage allowance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedWageAllowance {
    /// Stable source-system identifier for the allowance.
    pub wage_allowance_fixed_id: i64,
    /// The owning award's code.
    pub award_code: String,
    /// Stable identifier of the defining clause.
    pub clause_fixed_id: Option<i64>,
    /// Clause reference text.
    pub clauses: Option<String>,
    /// Name of the parent allowance group.
    pub parent_allowance: Option<String>,
    /// The allowance's display name.
    pub allowance: Option<String>,
    /// True when the allowance is folded into the hourly rate for all
    /// purposes.
    pub is_all_purpose: Option<bool>,
    /// Percentage-of-standard-rate expression of the allowance, when the
    /// source defines it that way.
    pub rate: Option<Decimal>,
    /// Unit of `rate`.
    pub rate_unit: Option<String>,
    /// The resolved dollar amount in the unit named by `payment_frequency`.
    pub allowance_amount: Option<Decimal>,
    /// Payment frequency ("Per hour", "Per week", "Per annum").
    pub payment_frequency: Option<String>,
    /// Start of this row's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of this row's operative window.
    pub operative_to: Option<NaiveDate>,
}

/// One staged penalty row.
///
/// A penalty is either multiplicative (`rate` is a fractional uplift, e.g.
/// 0.50 for a 50% Sunday penalty) or flat (`penalty_calculated_value` is an
/// hourly dollar amount). Rows carrying both are treated as multiplicative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPenalty {
    /// Stable source-system identifier for the penalty.
    pub penalty_fixed_id: i64,
    /// The owning award's code.
    pub award_code: String,
    /// Stable identifier of the defining clause.
    pub clause_fixed_id: Option<i64>,
    /// Description of the defining clause.
    pub clause_description: Option<String>,
    /// Classification level the penalty is restricted to; None applies to
    /// every level.
    pub classification_level: Option<i32>,
    /// Descriptive condition text (e.g. "Saturday", "Night shift - Monday
    /// to Friday").
    pub penalty_type: String,
    /// Explicit applicable-day override; takes precedence over whatever
    /// `penalty_type` implies.
    pub applicable_day: Option<String>,
    /// Fractional multiplier uplift (0.25 = 25% extra).
    pub rate: Option<Decimal>,
    /// Flat hourly dollar amount added instead of a multiplier.
    pub penalty_calculated_value: Option<Decimal>,
    /// Rate-type code restriction, when the penalty only applies to one
    /// employee rate type.
    pub employee_rate_type_code: Option<String>,
    /// Start of this row's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of this row's operative window.
    pub operative_to: Option<NaiveDate>,
}

impl StagedPenalty {
    /// Returns true if the penalty is multiplicative rather than flat.
    pub fn is_multiplicative(&self) -> bool {
        self.rate.is_some()
    }
}

/// A complete staged dataset: every table the producer populates.
///
/// Produced by the staging loader and handed to the store wholesale, so a
/// reload never exposes a half-replaced dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingDataset {
    /// All staged award header rows.
    #[serde(default)]
    pub awards: Vec<StagedAward>,
    /// All staged classification rows.
    #[serde(default)]
    pub classifications: Vec<StagedClassification>,
    /// All staged pay-rate rows.
    #[serde(default)]
    pub pay_rates: Vec<StagedPayRate>,
    /// All staged expense allowance rows.
    #[serde(default)]
    pub expense_allowances: Vec<StagedExpenseAllowance>,
    /// All staged wage allowance rows.
    #[serde(default)]
    pub wage_allowances: Vec<StagedWageAllowance>,
    /// All staged penalty rows.
    #[serde(default)]
    pub penalties: Vec<StagedPenalty>,
}

impl StagingDataset {
    /// Merges another dataset's rows into this one.
    pub fn merge(&mut self, other: StagingDataset) {
        self.awards.extend(other.awards);
        self.classifications.extend(other.classifications);
        self.pay_rates.extend(other.pay_rates);
        self.expense_allowances.extend(other.expense_allowances);
        self.wage_allowances.extend(other.wage_allowances);
        self.penalties.extend(other.penalties);
    }
}
