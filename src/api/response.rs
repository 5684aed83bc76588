//! Response types for the award compilation API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP statuses, and the list envelopes the read
//! endpoints reply with.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{AwardDetail, AwardSummary, CompileRunLog, Rule, RuleExecutionLog};
use crate::store::RatePage;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an award not found error response.
    pub fn award_not_found(code: &str) -> Self {
        Self::with_details(
            "AWARD_NOT_FOUND",
            format!("Award not found: {code}"),
            format!("No compiled or staged award carries the code '{code}'"),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {path}"),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {path}: {message}"),
                ),
            },
            EngineError::StagingLoad { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "STAGING_ERROR",
                    "Staging load failed",
                    format!("Failed to load {path}: {message}"),
                ),
            },
            EngineError::SchemaMismatch { table, column } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "STAGING_ERROR",
                    "Staging schema mismatch",
                    format!("Staging table '{table}' is missing expected column '{column}'"),
                ),
            },
            EngineError::AwardNotFound { code } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::award_not_found(&code),
            },
            EngineError::RuleNotFound { code } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "RULE_NOT_FOUND",
                    format!("Rule not found: {code}"),
                    format!("No catalog rule carries the code '{code}'"),
                ),
            },
            EngineError::InvalidFilter { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_FILTER",
                    format!("Invalid filter '{field}': {message}"),
                    "Adjust the query parameter and retry",
                ),
            },
            EngineError::CompileInFlight { award_code } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "COMPILE_IN_FLIGHT",
                    format!("A compile or calculation for award '{award_code}' is already in flight"),
                    "Retry once the running operation finishes",
                ),
            },
            EngineError::Storage { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

/// List envelope for compiled summary rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct AwardListResponse {
    /// Number of rows returned.
    pub count: usize,
    /// The summary rows.
    pub awards: Vec<AwardSummary>,
}

/// List envelope for compiled detail rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailListResponse {
    /// The award the rows belong to.
    pub award_code: String,
    /// Number of rows returned.
    pub count: usize,
    /// The detail rows.
    pub details: Vec<AwardDetail>,
}

/// Paginated envelope for calculated rate rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct RatePageResponse {
    /// Number of rows on this page.
    pub count: usize,
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total matching rows across all pages.
    pub total_records: usize,
    /// The rows on this page.
    pub rates: Vec<crate::models::CalculatedPayRate>,
}

impl From<RatePage> for RatePageResponse {
    fn from(page: RatePage) -> Self {
        RatePageResponse {
            count: page.rates.len(),
            page: page.page,
            page_size: page.page_size,
            total_records: page.total_records,
            rates: page.rates,
        }
    }
}

/// List envelope for catalog rules.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleListResponse {
    /// Number of rules returned.
    pub count: usize,
    /// The rules, priority order.
    pub rules: Vec<Rule>,
}

/// Outcome envelope for the rule seeding endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedRulesResponse {
    /// True when at least one rule was inserted.
    pub created: bool,
}

/// List envelope for rule execution log rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleLogListResponse {
    /// Number of rows returned.
    pub count: usize,
    /// The execution log rows, most recent first.
    pub logs: Vec<RuleExecutionLog>,
}

/// List envelope for compile run log rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunLogListResponse {
    /// Number of rows returned.
    pub count: usize,
    /// The run log rows, most recent first.
    pub logs: Vec<CompileRunLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_award_not_found_maps_to_404() {
        let engine_error = EngineError::AwardNotFound {
            code: "MA099999".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "AWARD_NOT_FOUND");
        assert!(api_error.error.message.contains("MA099999"));
    }

    #[test]
    fn test_compile_in_flight_maps_to_409() {
        let engine_error = EngineError::CompileInFlight {
            award_code: "MA000018".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "COMPILE_IN_FLIGHT");
    }

    #[test]
    fn test_invalid_filter_maps_to_400() {
        let engine_error = EngineError::InvalidFilter {
            field: "page_size".to_string(),
            message: "must be between 1 and 500".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_FILTER");
    }

    #[test]
    fn test_rate_page_envelope_counts_rows() {
        let page = RatePage {
            rates: Vec::new(),
            page: 2,
            page_size: 50,
            total_records: 120,
        };
        let response = RatePageResponse::from(page);
        assert_eq!(response.count, 0);
        assert_eq!(response.page, 2);
        assert_eq!(response.total_records, 120);
    }
}
