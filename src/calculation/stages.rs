//! The staged rate pipeline.
//!
//! [`RateComputation`] threads an hourly rate through the adjustment
//! stages in a fixed order (casual loading, age percentage, penalty,
//! all-purpose allowances), rounding after every stage and appending one
//! audit line per stage that fired. [`ComputedRate`] carries the final
//! rate together with every per-stage input and intermediate value, so a
//! calculated row can be replayed from its own fields.

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::AgeCategory;

/// In-progress staged computation for one combination.
pub struct RateComputation {
    rate: Decimal,
    scale: u32,
    steps: Vec<String>,
    casual_loading_applied: Option<Decimal>,
    casual_loaded_rate: Option<Decimal>,
    junior_percentage_applied: Option<Decimal>,
    junior_adjusted_rate: Option<Decimal>,
    apprentice_percentage_applied: Option<Decimal>,
    apprentice_adjusted_rate: Option<Decimal>,
    penalty_type: Option<String>,
    penalty_multiplier_applied: Option<Decimal>,
    penalty_flat_amount_applied: Option<Decimal>,
    penalty_adjusted_rate: Option<Decimal>,
}

/// The finished computation: final rate, audit trail, per-stage fields.
pub struct ComputedRate {
    /// The final staged hourly rate.
    pub final_rate: Decimal,
    /// Newline-joined audit trail, one line per stage.
    pub steps: String,
    /// Casual loading fraction, when the casual stage fired.
    pub casual_loading_applied: Option<Decimal>,
    /// Rate after casual loading.
    pub casual_loaded_rate: Option<Decimal>,
    /// Junior percentage, when the junior stage fired.
    pub junior_percentage_applied: Option<Decimal>,
    /// Rate after the junior percentage.
    pub junior_adjusted_rate: Option<Decimal>,
    /// Apprentice percentage, when the apprentice stage fired.
    pub apprentice_percentage_applied: Option<Decimal>,
    /// Rate after the apprentice percentage.
    pub apprentice_adjusted_rate: Option<Decimal>,
    /// Condition text of the penalty that fired.
    pub penalty_type: Option<String>,
    /// Multiplier applied by a multiplicative penalty.
    pub penalty_multiplier_applied: Option<Decimal>,
    /// Flat amount added by a flat penalty.
    pub penalty_flat_amount_applied: Option<Decimal>,
    /// Rate after the penalty stage.
    pub penalty_adjusted_rate: Option<Decimal>,
}

impl RateComputation {
    /// Starts a computation from an hourly base rate.
    ///
    /// `unit` is the unit the staged rate arrived in; it is recorded in
    /// the base audit line, while `base_rate` itself is already the
    /// hourly equivalent.
    pub fn new(base_rate: Decimal, unit: &str, scale: u32) -> Self {
        let rate = base_rate.round_dp(scale);
        RateComputation {
            rate,
            scale,
            steps: vec![format!("base rate ({unit}): {}", money(rate))],
            casual_loading_applied: None,
            casual_loaded_rate: None,
            junior_percentage_applied: None,
            junior_adjusted_rate: None,
            apprentice_percentage_applied: None,
            apprentice_adjusted_rate: None,
            penalty_type: None,
            penalty_multiplier_applied: None,
            penalty_flat_amount_applied: None,
            penalty_adjusted_rate: None,
        }
    }

    /// The rate as of the latest applied stage.
    pub fn current_rate(&self) -> Decimal {
        self.rate
    }

    /// Multiplies the rate by `1 + loading`.
    pub fn apply_casual_loading(&mut self, loading: Decimal) {
        let before = self.rate;
        let after = (before * (Decimal::ONE + loading)).round_dp(self.scale);
        self.steps.push(format!(
            "casual loading {}%: {} -> {}",
            percent(loading),
            money(before),
            money(after)
        ));
        self.casual_loading_applied = Some(loading);
        self.casual_loaded_rate = Some(after);
        self.rate = after;
    }

    /// Scales the rate by a junior or apprentice percentage.
    ///
    /// Calling this with [`AgeCategory::Adult`] is a no-op.
    pub fn apply_age_percentage(&mut self, category: AgeCategory, percentage: Decimal) {
        let token = match category {
            AgeCategory::Adult => return,
            AgeCategory::Junior(band) => band.token(),
            AgeCategory::Apprentice(year) => year.token(),
        };
        let before = self.rate;
        let after = (before * percentage).round_dp(self.scale);
        self.steps.push(format!(
            "{token} percentage {}%: {} -> {}",
            percent(percentage),
            money(before),
            money(after)
        ));
        match category {
            AgeCategory::Junior(_) => {
                self.junior_percentage_applied = Some(percentage);
                self.junior_adjusted_rate = Some(after);
            }
            AgeCategory::Apprentice(_) => {
                self.apprentice_percentage_applied = Some(percentage);
                self.apprentice_adjusted_rate = Some(after);
            }
            AgeCategory::Adult => {}
        }
        self.rate = after;
    }

    /// Applies a multiplicative penalty; `uplift` 0.50 means time and a
    /// half.
    pub fn apply_penalty_multiplier(&mut self, penalty_type: &str, uplift: Decimal) {
        let multiplier = Decimal::ONE + uplift;
        let before = self.rate;
        let after = (before * multiplier).round_dp(self.scale);
        self.steps.push(format!(
            "{penalty_type} penalty x{}: {} -> {}",
            multiplier_display(multiplier),
            money(before),
            money(after)
        ));
        self.penalty_type = Some(penalty_type.to_string());
        self.penalty_multiplier_applied = Some(multiplier);
        self.penalty_adjusted_rate = Some(after);
        self.rate = after;
    }

    /// Applies a flat-dollar penalty.
    pub fn apply_penalty_flat(&mut self, penalty_type: &str, amount: Decimal) {
        let before = self.rate;
        let after = (before + amount).round_dp(self.scale);
        self.steps.push(format!(
            "{penalty_type} penalty +{}: {} -> {}",
            money(amount),
            money(before),
            money(after)
        ));
        self.penalty_type = Some(penalty_type.to_string());
        self.penalty_flat_amount_applied = Some(amount);
        self.penalty_adjusted_rate = Some(after);
        self.rate = after;
    }

    /// Folds one all-purpose allowance into the hourly rate.
    pub fn apply_allowance(&mut self, name: &str, hourly: Decimal) {
        let before = self.rate;
        let after = (before + hourly).round_dp(self.scale);
        self.steps.push(format!(
            "all-purpose allowance {name} +{}: {} -> {}",
            money(hourly),
            money(before),
            money(after)
        ));
        self.rate = after;
    }

    /// Closes the trail with the final line and hands back every stage
    /// field.
    pub fn finish(mut self) -> ComputedRate {
        self.steps
            .push(format!("calculated hourly rate: {}", money(self.rate)));
        ComputedRate {
            final_rate: self.rate,
            steps: self.steps.join("\n"),
            casual_loading_applied: self.casual_loading_applied,
            casual_loaded_rate: self.casual_loaded_rate,
            junior_percentage_applied: self.junior_percentage_applied,
            junior_adjusted_rate: self.junior_adjusted_rate,
            apprentice_percentage_applied: self.apprentice_percentage_applied,
            apprentice_adjusted_rate: self.apprentice_adjusted_rate,
            penalty_type: self.penalty_type,
            penalty_multiplier_applied: self.penalty_multiplier_applied,
            penalty_flat_amount_applied: self.penalty_flat_amount_applied,
            penalty_adjusted_rate: self.penalty_adjusted_rate,
        }
    }
}

/// Converts an allowance amount to its hourly equivalent.
///
/// Per-hour amounts pass through, per-week and per-annum amounts are
/// divided by the configured divisors. Event-based frequencies ("Per
/// occasion", "Per shift") have no hourly equivalent and return `None`.
pub fn allowance_hourly_equivalent(
    config: &EngineConfig,
    amount: Decimal,
    frequency: Option<&str>,
) -> Option<Decimal> {
    let frequency = frequency?.to_ascii_lowercase();
    if frequency.contains("hour") {
        Some(amount)
    } else if frequency.contains("week") {
        Some((amount / config.engine.weekly_divisor).round_dp(config.engine.rate_scale))
    } else if frequency.contains("annum") || frequency.contains("year") {
        Some((amount / config.engine.annual_divisor).round_dp(config.engine.rate_scale))
    } else {
        None
    }
}

fn money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

fn percent(fraction: Decimal) -> String {
    (fraction * Decimal::ONE_HUNDRED).normalize().to_string()
}

/// Multipliers print with at least two decimals ("x1.50"), more when the
/// uplift carries them ("x1.125").
fn multiplier_display(multiplier: Decimal) -> String {
    let normalized = multiplier.normalize();
    if normalized.scale() <= 2 {
        format!("{multiplier:.2}")
    } else {
        normalized.to_string()
    }
}
