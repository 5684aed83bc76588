//! Pay-rate calculation over the award combination space.
//!
//! [`axes`] derives the per-award condition axes from the staged rows,
//! [`stages`] runs one combination through the adjustment pipeline with a
//! per-stage audit trail, and [`RateCalculator`] ties them together: it
//! enumerates every classification's combinations and commits the
//! resulting rows one award at a time.

pub mod axes;
pub mod calculator;
pub mod stages;

pub use axes::AwardAxes;
pub use calculator::{CalculationScope, RateCalculator};
pub use stages::{ComputedRate, RateComputation};
