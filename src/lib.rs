//! Award rule compilation and pay-rate calculation engine.
//!
//! This crate compiles staged award data (awards, classifications, pay
//! rates, allowances and penalties) into summary and detail records,
//! enumerates every classification, employment type, day type, shift
//! type and age category combination into auditable hourly rates, and
//! runs a compliance rule catalog over the compiled output.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod compile;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;
pub mod staging;
pub mod store;
