//! Configuration types for the compilation and calculation engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the engine's YAML configuration file. Every
//! section has defaults, so a minimal file (or none, for tests) yields a
//! working configuration.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{ApprenticeYear, JuniorBand};

/// How casual loading combines with junior/apprentice percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingInteraction {
    /// The junior/apprentice percentage multiplies the casual-loaded rate.
    Stack,
    /// Junior/apprentice brackets skip the casual stage; the band
    /// percentage is deemed loading-inclusive.
    Branch,
}

/// Engine-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Identity written into `compiled_by` on every calculated row.
    #[serde(default = "default_compiled_by")]
    pub compiled_by: String,
    /// Divisor converting a weekly amount to hourly (ordinary weekly hours).
    #[serde(default = "default_weekly_divisor")]
    pub weekly_divisor: Decimal,
    /// Divisor converting an annual amount to hourly (52 x weekly hours).
    #[serde(default = "default_annual_divisor")]
    pub annual_divisor: Decimal,
    /// Decimal places for derived hourly amounts.
    #[serde(default = "default_rate_scale")]
    pub rate_scale: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            compiled_by: default_compiled_by(),
            weekly_divisor: default_weekly_divisor(),
            annual_divisor: default_annual_divisor(),
            rate_scale: default_rate_scale(),
        }
    }
}

/// Default adjustment parameters, used where no per-award override exists.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentDefaults {
    /// Casual loading as a fraction (0.25 = 25%).
    #[serde(default = "default_casual_loading")]
    pub casual_loading: Decimal,
    /// Clause reference recorded for the casual loading stage.
    #[serde(default)]
    pub casual_clause: Option<String>,
    /// Clause reference recorded for junior/apprentice stages.
    #[serde(default)]
    pub junior_clause: Option<String>,
    /// Whether casual loading stacks with junior/apprentice percentages.
    #[serde(default = "default_loading_interaction")]
    pub loading_interaction: LoadingInteraction,
    /// Whether the casual employment type is enumerated at all.
    #[serde(default = "default_true")]
    pub include_casual: bool,
    /// Junior percentage of the adult rate, keyed by band token.
    #[serde(default = "default_junior_percentages")]
    pub junior_percentages: HashMap<String, Decimal>,
    /// Apprentice percentage of the adult rate, keyed by year token.
    #[serde(default = "default_apprentice_percentages")]
    pub apprentice_percentages: HashMap<String, Decimal>,
}

impl Default for AdjustmentDefaults {
    fn default() -> Self {
        AdjustmentDefaults {
            casual_loading: default_casual_loading(),
            casual_clause: None,
            junior_clause: None,
            loading_interaction: default_loading_interaction(),
            include_casual: true,
            junior_percentages: default_junior_percentages(),
            apprentice_percentages: default_apprentice_percentages(),
        }
    }
}

/// Per-award overrides of the adjustment defaults. Absent fields fall
/// through to [`AdjustmentDefaults`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardOverride {
    /// Casual loading override.
    #[serde(default)]
    pub casual_loading: Option<Decimal>,
    /// Casual clause reference override.
    #[serde(default)]
    pub casual_clause: Option<String>,
    /// Junior/apprentice clause reference override.
    #[serde(default)]
    pub junior_clause: Option<String>,
    /// Loading interaction override.
    #[serde(default)]
    pub loading_interaction: Option<LoadingInteraction>,
    /// Casual enumeration override.
    #[serde(default)]
    pub include_casual: Option<bool>,
}

/// Parameters read by the built-in rule expressions.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleParameters {
    /// Statutory minimum hourly base rate.
    #[serde(default = "default_base_rate_floor")]
    pub base_rate_floor: Decimal,
    /// Largest allowed max/min base-rate ratio within one award.
    #[serde(default = "default_max_rate_spread")]
    pub max_rate_spread: Decimal,
}

impl Default for RuleParameters {
    fn default() -> Self {
        RuleParameters {
            base_rate_floor: default_base_rate_floor(),
            max_rate_spread: default_max_rate_spread(),
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Engine-wide settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Default adjustment parameters.
    #[serde(default)]
    pub defaults: AdjustmentDefaults,
    /// Per-award overrides, keyed by award code.
    #[serde(default)]
    pub awards: HashMap<String, AwardOverride>,
    /// Parameters for the built-in rules.
    #[serde(default)]
    pub rules: RuleParameters,
}

impl EngineConfig {
    /// Resolves the casual loading fraction for an award.
    pub fn casual_loading(&self, award_code: &str) -> Decimal {
        self.awards
            .get(award_code)
            .and_then(|o| o.casual_loading)
            .unwrap_or(self.defaults.casual_loading)
    }

    /// Resolves the loading interaction policy for an award.
    pub fn loading_interaction(&self, award_code: &str) -> LoadingInteraction {
        self.awards
            .get(award_code)
            .and_then(|o| o.loading_interaction)
            .unwrap_or(self.defaults.loading_interaction)
    }

    /// Resolves whether the casual employment type is enumerated for an
    /// award.
    pub fn include_casual(&self, award_code: &str) -> bool {
        self.awards
            .get(award_code)
            .and_then(|o| o.include_casual)
            .unwrap_or(self.defaults.include_casual)
    }

    /// Resolves the casual clause reference for an award.
    pub fn casual_clause(&self, award_code: &str) -> Option<String> {
        self.awards
            .get(award_code)
            .and_then(|o| o.casual_clause.clone())
            .or_else(|| self.defaults.casual_clause.clone())
    }

    /// Resolves the junior/apprentice clause reference for an award.
    pub fn junior_clause(&self, award_code: &str) -> Option<String> {
        self.awards
            .get(award_code)
            .and_then(|o| o.junior_clause.clone())
            .or_else(|| self.defaults.junior_clause.clone())
    }

    /// Returns the junior percentage for a band.
    pub fn junior_percentage(&self, band: JuniorBand) -> Decimal {
        self.defaults
            .junior_percentages
            .get(band.token())
            .copied()
            .unwrap_or_else(|| builtin_junior_percentage(band))
    }

    /// Returns the apprentice percentage for a year.
    pub fn apprentice_percentage(&self, year: ApprenticeYear) -> Decimal {
        self.defaults
            .apprentice_percentages
            .get(year.token())
            .copied()
            .unwrap_or_else(|| builtin_apprentice_percentage(year))
    }

    /// Converts a staged rate to its hourly equivalent using the
    /// configured divisors.
    ///
    /// Weekly and annual amounts are divided down and rounded to
    /// `rate_scale` places; hourly and unrecognized units pass through
    /// unchanged.
    pub fn hourly_equivalent(&self, rate: Decimal, rate_type: Option<&str>) -> Decimal {
        let divided = match rate_type {
            Some(unit) if unit.eq_ignore_ascii_case("weekly") => rate / self.engine.weekly_divisor,
            Some(unit) if unit.eq_ignore_ascii_case("annual") => rate / self.engine.annual_divisor,
            _ => return rate,
        };
        divided.round_dp(self.engine.rate_scale)
    }
}

fn default_compiled_by() -> String {
    "award-compiler".to_string()
}

fn default_weekly_divisor() -> Decimal {
    Decimal::new(38, 0)
}

fn default_annual_divisor() -> Decimal {
    // 52 weeks x 38 ordinary hours.
    Decimal::new(1976, 0)
}

fn default_rate_scale() -> u32 {
    4
}

fn default_casual_loading() -> Decimal {
    Decimal::new(25, 2)
}

fn default_loading_interaction() -> LoadingInteraction {
    LoadingInteraction::Stack
}

fn default_true() -> bool {
    true
}

fn builtin_junior_percentage(band: JuniorBand) -> Decimal {
    match band {
        JuniorBand::Under16 => Decimal::new(45, 2),
        JuniorBand::Age16 => Decimal::new(50, 2),
        JuniorBand::Age17 => Decimal::new(60, 2),
        JuniorBand::Age18 => Decimal::new(70, 2),
        JuniorBand::Age19 => Decimal::new(80, 2),
        JuniorBand::Age20 => Decimal::new(90, 2),
    }
}

fn builtin_apprentice_percentage(year: ApprenticeYear) -> Decimal {
    match year {
        ApprenticeYear::Year1 => Decimal::new(55, 2),
        ApprenticeYear::Year2 => Decimal::new(65, 2),
        ApprenticeYear::Year3 => Decimal::new(80, 2),
        ApprenticeYear::Year4 => Decimal::new(95, 2),
    }
}

fn default_junior_percentages() -> HashMap<String, Decimal> {
    JuniorBand::ALL
        .into_iter()
        .map(|band| (band.token().to_string(), builtin_junior_percentage(band)))
        .collect()
}

fn default_apprentice_percentages() -> HashMap<String, Decimal> {
    ApprenticeYear::ALL
        .into_iter()
        .map(|year| (year.token().to_string(), builtin_apprentice_percentage(year)))
        .collect()
}

fn default_base_rate_floor() -> Decimal {
    // National minimum wage hourly rate, 1 July 2024.
    Decimal::new(2410, 2)
}

fn default_max_rate_spread() -> Decimal {
    Decimal::new(30, 1)
}
