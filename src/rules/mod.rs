//! The compliance rule catalog and its application engine.
//!
//! Rules live in the catalog as data: a code, a priority, and a
//! serialized expression the engine interprets at apply time. The twelve
//! built-ins in [`catalog`] cover pay-rate, allowance, classification,
//! and compliance checks; [`RuleEngine`] evaluates any of them against a
//! compiled award and appends one execution log row per attempt.

pub mod catalog;
pub mod engine;

pub use engine::RuleEngine;
