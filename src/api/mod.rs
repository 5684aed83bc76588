//! HTTP API module for the award compilation engine.
//!
//! This module provides the REST endpoints for compiling staged awards,
//! calculating pay rates, and running the compliance rule catalog.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ApplyRuleRequest, CalculateRequest, CompileRequest};
pub use response::ApiError;
pub use state::AppState;
