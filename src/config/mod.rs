//! Engine configuration loading and types.
//!
//! The engine reads one YAML file holding engine-wide settings, default
//! adjustment parameters, per-award overrides, and the parameters the
//! built-in rules are seeded with.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AdjustmentDefaults, AwardOverride, EngineConfig, EngineSettings, LoadingInteraction,
    RuleParameters,
};
