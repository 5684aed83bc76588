//! Compiled per-award summary rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One compiled summary row per award.
///
/// Produced by the summary compiler from the staging tables; replaced
/// wholesale on every recompile of the award. All counts and rate
/// aggregates are derived, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardSummary {
    /// The award code (unique per summary row).
    pub award_code: String,
    /// The award's display name.
    pub award_name: String,
    /// Industry grouping carried over from staging.
    pub industry: Option<String>,
    /// Number of staged classification rows for the award.
    pub total_classifications: usize,
    /// Number of staged pay-rate rows for the award.
    pub total_pay_rates: usize,
    /// Number of staged expense allowance rows for the award.
    pub total_expense_allowances: usize,
    /// Number of staged wage allowance rows for the award.
    pub total_wage_allowances: usize,
    /// Smallest staged base rate, in the staging row's own unit.
    pub min_base_rate: Option<Decimal>,
    /// Largest staged base rate.
    pub max_base_rate: Option<Decimal>,
    /// Mean staged base rate, rounded to 4 decimal places.
    pub avg_base_rate: Option<Decimal>,
    /// Start of the award's operative window.
    pub operative_from: Option<NaiveDate>,
    /// End of the award's operative window; open-ended when absent.
    pub operative_to: Option<NaiveDate>,
    /// Source version number of the award document.
    pub version_number: Option<i32>,
    /// Year the award version was published.
    pub published_year: Option<i32>,
    /// True for locally-defined awards.
    pub is_custom: bool,
    /// True when the compile date fell inside the operative window.
    pub is_active: bool,
    /// When this summary row was compiled.
    pub compiled_at: DateTime<Utc>,
}
