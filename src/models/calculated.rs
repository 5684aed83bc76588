//! Calculated pay-rate rows and the condition axes they are keyed on.
//!
//! A calculated rate is unique per active row on (award, classification,
//! employment type, day type, shift type, age category). The axis enums
//! here define the combination space the calculator enumerates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The employment arrangement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment (38 ordinary hours per week).
    FullTime,
    /// Part-time employment with a regular pattern.
    PartTime,
    /// Casual employment, attracting casual loading.
    Casual,
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmploymentType::FullTime => write!(f, "full-time"),
            EmploymentType::PartTime => write!(f, "part-time"),
            EmploymentType::Casual => write!(f, "casual"),
        }
    }
}

/// The calendar-day axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDayType {
    /// Monday through Friday ordinary time.
    Weekday,
    /// Saturday work.
    Saturday,
    /// Sunday work.
    Sunday,
    /// Gazetted public holiday work.
    PublicHoliday,
}

impl std::fmt::Display for RateDayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateDayType::Weekday => write!(f, "Weekday"),
            RateDayType::Saturday => write!(f, "Saturday"),
            RateDayType::Sunday => write!(f, "Sunday"),
            RateDayType::PublicHoliday => write!(f, "Public holiday"),
        }
    }
}

/// The shift-span axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Ordinary day span.
    Ordinary,
    /// Afternoon shift finishing after 6pm.
    Afternoon,
    /// Night shift.
    Night,
    /// Early morning shift commencing before 6am.
    EarlyMorning,
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::Ordinary => write!(f, "Ordinary"),
            ShiftType::Afternoon => write!(f, "Afternoon"),
            ShiftType::Night => write!(f, "Night"),
            ShiftType::EarlyMorning => write!(f, "Early morning"),
        }
    }
}

/// Junior age band within the age-category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JuniorBand {
    /// Under 16 years of age.
    Under16,
    /// 16 years of age.
    Age16,
    /// 17 years of age.
    Age17,
    /// 18 years of age.
    Age18,
    /// 19 years of age.
    Age19,
    /// 20 years of age.
    Age20,
}

impl JuniorBand {
    /// Every junior band, youngest first.
    pub const ALL: [JuniorBand; 6] = [
        JuniorBand::Under16,
        JuniorBand::Age16,
        JuniorBand::Age17,
        JuniorBand::Age18,
        JuniorBand::Age19,
        JuniorBand::Age20,
    ];

    /// The stable token used in serialized rows and config keys.
    pub fn token(&self) -> &'static str {
        match self {
            JuniorBand::Under16 => "junior_under_16",
            JuniorBand::Age16 => "junior_16",
            JuniorBand::Age17 => "junior_17",
            JuniorBand::Age18 => "junior_18",
            JuniorBand::Age19 => "junior_19",
            JuniorBand::Age20 => "junior_20",
        }
    }
}

/// Apprenticeship year within the age-category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprenticeYear {
    /// First year of the apprenticeship.
    Year1,
    /// Second year.
    Year2,
    /// Third year.
    Year3,
    /// Fourth year.
    Year4,
}

impl ApprenticeYear {
    /// Every apprenticeship year, first year first.
    pub const ALL: [ApprenticeYear; 4] = [
        ApprenticeYear::Year1,
        ApprenticeYear::Year2,
        ApprenticeYear::Year3,
        ApprenticeYear::Year4,
    ];

    /// The stable token used in serialized rows and config keys.
    pub fn token(&self) -> &'static str {
        match self {
            ApprenticeYear::Year1 => "apprentice_year_1",
            ApprenticeYear::Year2 => "apprentice_year_2",
            ApprenticeYear::Year3 => "apprentice_year_3",
            ApprenticeYear::Year4 => "apprentice_year_4",
        }
    }
}

/// The employee age/experience axis.
///
/// Serializes as its stable token ("adult", "junior_17",
/// "apprentice_year_2") so filters and stored rows use one spelling.
///
/// # Example
///
/// ```
/// use award_compiler::models::{AgeCategory, JuniorBand};
///
/// let category = AgeCategory::Junior(JuniorBand::Age17);
/// let json = serde_json::to_string(&category).unwrap();
/// assert_eq!(json, "\"junior_17\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgeCategory {
    /// Standard adult rate.
    Adult,
    /// A junior age band, paid a percentage of the adult rate.
    Junior(JuniorBand),
    /// An apprenticeship year, paid a percentage of the adult rate.
    Apprentice(ApprenticeYear),
}

impl AgeCategory {
    /// The stable token for this category.
    pub fn token(&self) -> &'static str {
        match self {
            AgeCategory::Adult => "adult",
            AgeCategory::Junior(band) => band.token(),
            AgeCategory::Apprentice(year) => year.token(),
        }
    }

    /// Returns true for junior bands.
    pub fn is_junior(&self) -> bool {
        matches!(self, AgeCategory::Junior(_))
    }

    /// Returns true for apprenticeship years.
    pub fn is_apprentice(&self) -> bool {
        matches!(self, AgeCategory::Apprentice(_))
    }
}

impl std::fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl From<AgeCategory> for String {
    fn from(category: AgeCategory) -> Self {
        category.token().to_string()
    }
}

impl TryFrom<String> for AgeCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "adult" {
            return Ok(AgeCategory::Adult);
        }
        for band in JuniorBand::ALL {
            if value == band.token() {
                return Ok(AgeCategory::Junior(band));
            }
        }
        for year in ApprenticeYear::ALL {
            if value == year.token() {
                return Ok(AgeCategory::Apprentice(year));
            }
        }
        Err(format!("unknown age category '{value}'"))
    }
}

/// One calculated pay-rate row: the output of the pay-rate calculator.
///
/// Every stage that fired records its input multiplier/amount and the rate
/// it produced, so the final `calculated_hourly_rate` can be audited back
/// through `calculation_steps` to the staged base rate and source clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedPayRate {
    /// The award code.
    pub award_code: String,
    /// The classification's display name.
    pub classification: String,
    /// Stable source identifier of the classification.
    pub classification_fixed_id: i64,
    /// Numeric level within the award's hierarchy.
    pub classification_level: Option<i32>,
    /// Employment arrangement axis value.
    pub employment_type: EmploymentType,
    /// Calendar-day axis value.
    pub day_type: RateDayType,
    /// Shift-span axis value.
    pub shift_type: ShiftType,
    /// Age/experience axis value.
    pub age_category: AgeCategory,
    /// The hourly base rate the staging provided (or derived from weekly).
    pub base_rate: Decimal,
    /// Unit the staged base rate arrived in ("Hourly" or "Weekly").
    pub base_rate_type: String,
    /// Casual loading fraction applied, when the casual stage fired.
    pub casual_loading_applied: Option<Decimal>,
    /// Rate after casual loading.
    pub casual_loaded_rate: Option<Decimal>,
    /// Junior percentage applied, when the junior stage fired.
    pub junior_percentage_applied: Option<Decimal>,
    /// Rate after the junior percentage.
    pub junior_adjusted_rate: Option<Decimal>,
    /// Apprentice percentage applied, when the apprentice stage fired.
    pub apprentice_percentage_applied: Option<Decimal>,
    /// Rate after the apprentice percentage.
    pub apprentice_adjusted_rate: Option<Decimal>,
    /// Condition text of the penalty row that matched, if any.
    pub penalty_type: Option<String>,
    /// Penalty multiplier applied (1.50 for a 50% penalty).
    pub penalty_multiplier_applied: Option<Decimal>,
    /// Flat penalty amount added instead of a multiplier.
    pub penalty_flat_amount_applied: Option<Decimal>,
    /// Rate after the penalty stage.
    pub penalty_adjusted_rate: Option<Decimal>,
    /// All-purpose allowance ids folded into the hourly rate.
    #[serde(default)]
    pub applicable_allowance_ids: Vec<i64>,
    /// Hourly-equivalent total of the folded allowances.
    pub applicable_allowance_total: Decimal,
    /// Non-all-purpose allowance ids, listed but not folded.
    #[serde(default)]
    pub other_allowance_ids: Vec<i64>,
    /// Hourly-equivalent total of the non-folded allowances.
    pub other_allowance_total: Decimal,
    /// The final staged hourly rate.
    pub calculated_hourly_rate: Decimal,
    /// Human-readable staged audit trail, one line per stage.
    pub calculation_steps: String,
    /// Clause reference of the matched penalty row.
    pub penalty_clause: Option<String>,
    /// Clause reference of the casual loading provision.
    pub casual_clause: Option<String>,
    /// Clause reference of the junior/apprentice provision.
    pub junior_clause: Option<String>,
    /// Start of the row's effective window.
    pub effective_from: Option<NaiveDate>,
    /// End of the row's effective window.
    pub effective_to: Option<NaiveDate>,
    /// False once a later calculation run replaces this row.
    pub is_active: bool,
    /// When this row was calculated.
    pub compiled_at: DateTime<Utc>,
    /// Identity of the compiling engine instance.
    pub compiled_by: String,
}
