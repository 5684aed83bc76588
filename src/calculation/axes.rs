//! Condition-axis derivation for one award.
//!
//! The calculator enumerates the cross product of four axes per
//! classification. Which values each axis takes is driven by the staged
//! data: penalties pull in the day and shift values they reference, the
//! pay-rate coding pulls in junior and apprentice brackets, and config
//! decides whether casual employment is enumerated at all.

use crate::config::EngineConfig;
use crate::models::{
    AgeCategory, ApprenticeYear, EmploymentType, JuniorBand, RateDayType, ShiftType, StagedPayRate,
    StagedPenalty,
};

/// The per-award combination space, one axis per dimension.
///
/// Axis values are held in canonical enum order so enumeration (and the
/// resulting row order) is deterministic for a given staging snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardAxes {
    /// Employment arrangements to enumerate.
    pub employment_types: Vec<EmploymentType>,
    /// Day types to enumerate; always includes `Weekday`.
    pub day_types: Vec<RateDayType>,
    /// Shift types to enumerate; always includes `Ordinary`.
    pub shift_types: Vec<ShiftType>,
    /// Age categories to enumerate; always includes `Adult`.
    pub age_categories: Vec<AgeCategory>,
}

impl AwardAxes {
    /// Derives the combination space for one award from its staged rows.
    pub fn derive(
        config: &EngineConfig,
        award_code: &str,
        pay_rates: &[StagedPayRate],
        penalties: &[StagedPenalty],
    ) -> AwardAxes {
        let mut employment_types = vec![EmploymentType::FullTime, EmploymentType::PartTime];
        if config.include_casual(award_code) {
            employment_types.push(EmploymentType::Casual);
        }

        let mut day_types = vec![RateDayType::Weekday];
        for day in [
            RateDayType::Saturday,
            RateDayType::Sunday,
            RateDayType::PublicHoliday,
        ] {
            if penalties.iter().any(|p| day_type_of(p) == Some(day)) {
                day_types.push(day);
            }
        }

        let mut shift_types = vec![ShiftType::Ordinary];
        for shift in [
            ShiftType::Afternoon,
            ShiftType::Night,
            ShiftType::EarlyMorning,
        ] {
            if penalties.iter().any(|p| shift_type_of(p) == Some(shift)) {
                shift_types.push(shift);
            }
        }

        let mut age_categories = vec![AgeCategory::Adult];
        if pay_rates.iter().any(StagedPayRate::is_junior_coded) {
            age_categories.extend(JuniorBand::ALL.into_iter().map(AgeCategory::Junior));
        }
        if pay_rates.iter().any(StagedPayRate::is_apprentice_coded) {
            age_categories.extend(ApprenticeYear::ALL.into_iter().map(AgeCategory::Apprentice));
        }

        AwardAxes {
            employment_types,
            day_types,
            shift_types,
            age_categories,
        }
    }

    /// Number of combinations enumerated per classification.
    pub fn combination_count(&self) -> usize {
        self.employment_types.len()
            * self.day_types.len()
            * self.shift_types.len()
            * self.age_categories.len()
    }
}

/// Classifies a staged penalty onto the day axis.
///
/// An explicit `applicable_day` wins over whatever the condition text
/// implies. "Public holiday" is matched before the weekday names so
/// "Sunday public holiday" lands on the holiday axis value.
pub fn day_type_of(penalty: &StagedPenalty) -> Option<RateDayType> {
    let text = penalty
        .applicable_day
        .as_deref()
        .unwrap_or(&penalty.penalty_type);
    classify_day(text)
}

/// Classifies a staged penalty onto the shift axis.
pub fn shift_type_of(penalty: &StagedPenalty) -> Option<ShiftType> {
    let text = penalty.penalty_type.to_ascii_lowercase();
    if text.contains("early morning") {
        Some(ShiftType::EarlyMorning)
    } else if text.contains("night") {
        Some(ShiftType::Night)
    } else if text.contains("afternoon") {
        Some(ShiftType::Afternoon)
    } else {
        None
    }
}

fn classify_day(text: &str) -> Option<RateDayType> {
    let text = text.to_ascii_lowercase();
    if text.contains("public holiday") {
        Some(RateDayType::PublicHoliday)
    } else if text.contains("saturday") {
        Some(RateDayType::Saturday)
    } else if text.contains("sunday") {
        Some(RateDayType::Sunday)
    } else if text.contains("weekday") || text.contains("monday to friday") {
        Some(RateDayType::Weekday)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn penalty(penalty_type: &str, applicable_day: Option<&str>) -> StagedPenalty {
        StagedPenalty {
            penalty_fixed_id: 500,
            award_code: "MA000018".to_string(),
            clause_fixed_id: None,
            clause_description: None,
            classification_level: None,
            penalty_type: penalty_type.to_string(),
            applicable_day: applicable_day.map(str::to_string),
            rate: Some(dec("0.50")),
            penalty_calculated_value: None,
            employee_rate_type_code: None,
            operative_from: None,
            operative_to: None,
        }
    }

    fn rate_with_code(code: Option<&str>) -> StagedPayRate {
        StagedPayRate {
            classification_fixed_id: 101,
            award_code: "MA000018".to_string(),
            base_pay_rate_id: None,
            base_rate_type: Some("Hourly".to_string()),
            base_rate: Some(dec("24.98")),
            calculated_pay_rate_id: None,
            calculated_rate_type: None,
            calculated_rate: None,
            parent_classification_name: None,
            classification: Some("Level 1".to_string()),
            classification_level: Some(1),
            employee_rate_type_code: code.map(str::to_string),
            operative_from: None,
            operative_to: None,
            version_number: None,
        }
    }

    #[test]
    fn test_day_classification_from_condition_text() {
        assert_eq!(
            day_type_of(&penalty("Saturday work - ordinary hours", None)),
            Some(RateDayType::Saturday)
        );
        assert_eq!(
            day_type_of(&penalty("Sunday", None)),
            Some(RateDayType::Sunday)
        );
        assert_eq!(
            day_type_of(&penalty("Public holiday", None)),
            Some(RateDayType::PublicHoliday)
        );
    }

    #[test]
    fn test_applicable_day_overrides_condition_text() {
        let p = penalty("Night shift - Monday to Friday", Some("Weekday"));
        assert_eq!(day_type_of(&p), Some(RateDayType::Weekday));
    }

    #[test]
    fn test_public_holiday_wins_over_day_names() {
        let p = penalty("Sunday public holiday", None);
        assert_eq!(day_type_of(&p), Some(RateDayType::PublicHoliday));
    }

    #[test]
    fn test_shift_classification_from_condition_text() {
        assert_eq!(
            shift_type_of(&penalty("Night shift - Monday to Friday", None)),
            Some(ShiftType::Night)
        );
        assert_eq!(
            shift_type_of(&penalty("Afternoon shift", None)),
            Some(ShiftType::Afternoon)
        );
        assert_eq!(
            shift_type_of(&penalty("Early morning shift", None)),
            Some(ShiftType::EarlyMorning)
        );
        assert_eq!(shift_type_of(&penalty("Saturday", None)), None);
    }

    #[test]
    fn test_minimal_award_axes() {
        let axes = AwardAxes::derive(
            &EngineConfig::default(),
            "MA000018",
            &[rate_with_code(Some("AD"))],
            &[],
        );
        assert_eq!(
            axes.employment_types,
            vec![
                EmploymentType::FullTime,
                EmploymentType::PartTime,
                EmploymentType::Casual
            ]
        );
        assert_eq!(axes.day_types, vec![RateDayType::Weekday]);
        assert_eq!(axes.shift_types, vec![ShiftType::Ordinary]);
        assert_eq!(axes.age_categories, vec![AgeCategory::Adult]);
        assert_eq!(axes.combination_count(), 3);
    }

    #[test]
    fn test_penalties_pull_in_day_and_shift_values() {
        let penalties = vec![
            penalty("Saturday work - ordinary hours", None),
            penalty("Sunday", None),
            penalty("Public holiday", None),
            penalty("Night shift - Monday to Friday", Some("Weekday")),
            penalty("Afternoon shift - Monday to Friday", Some("Weekday")),
        ];
        let axes = AwardAxes::derive(
            &EngineConfig::default(),
            "MA000018",
            &[rate_with_code(Some("AD"))],
            &penalties,
        );
        assert_eq!(
            axes.day_types,
            vec![
                RateDayType::Weekday,
                RateDayType::Saturday,
                RateDayType::Sunday,
                RateDayType::PublicHoliday
            ]
        );
        assert_eq!(
            axes.shift_types,
            vec![ShiftType::Ordinary, ShiftType::Afternoon, ShiftType::Night]
        );
    }

    #[test]
    fn test_junior_coding_expands_age_axis() {
        let rates = vec![rate_with_code(Some("AD")), rate_with_code(Some("JN"))];
        let axes = AwardAxes::derive(&EngineConfig::default(), "MA000018", &rates, &[]);
        // Adult plus the six junior bands.
        assert_eq!(axes.age_categories.len(), 7);
        assert_eq!(axes.age_categories[0], AgeCategory::Adult);
        assert_eq!(
            axes.age_categories[1],
            AgeCategory::Junior(JuniorBand::Under16)
        );
    }

    #[test]
    fn test_apprentice_coding_expands_age_axis() {
        let rates = vec![rate_with_code(Some("AD")), rate_with_code(Some("AP"))];
        let axes = AwardAxes::derive(&EngineConfig::default(), "MA000018", &rates, &[]);
        assert_eq!(axes.age_categories.len(), 5);
        assert_eq!(
            axes.age_categories[4],
            AgeCategory::Apprentice(ApprenticeYear::Year4)
        );
    }

    #[test]
    fn test_casual_excluded_when_config_says_so() {
        let mut config = EngineConfig::default();
        config.defaults.include_casual = false;
        let axes = AwardAxes::derive(&config, "MA000018", &[rate_with_code(Some("AD"))], &[]);
        assert_eq!(
            axes.employment_types,
            vec![EmploymentType::FullTime, EmploymentType::PartTime]
        );
    }
}
