//! Request types for the award compilation API.
//!
//! This module defines the JSON bodies accepted by the command endpoints
//! and the query parameter structures accepted by the read endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for the `/compile/summary` and `/compile/detail` endpoints.
///
/// An absent `award_code` compiles every staged award.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Optional award code narrowing the run to a single award.
    #[serde(default)]
    pub award_code: Option<String>,
}

/// Request body for the `/calculate` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// Optional award code narrowing the run to a single award.
    #[serde(default)]
    pub award_code: Option<String>,
    /// Optional classification fixed id narrowing each award in scope.
    #[serde(default)]
    pub classification: Option<i64>,
    /// When true, awards that already hold active rates are skipped.
    #[serde(default)]
    pub resume: bool,
}

/// Request body for the `/rules/apply` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRuleRequest {
    /// Code of the catalog rule to execute.
    pub rule_code: String,
    /// Code of the compiled award to execute it against.
    pub award_code: String,
}

/// Query parameters for the `/awards` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardsQuery {
    /// Exact award code match.
    pub code: Option<String>,
    /// Case-insensitive industry substring match.
    pub industry: Option<String>,
    /// Filter on the active flag.
    pub active: Option<bool>,
}

/// Query parameters for the `/awards/:code/details` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsQuery {
    /// Detail record kind token, e.g. `PAYRATE`.
    pub record_type: Option<String>,
    /// Classification restriction: a fixed id or an exact name.
    pub classification: Option<String>,
}

/// Query parameters for the `/rates` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesQuery {
    /// Exact award code match.
    pub award_code: Option<String>,
    /// Classification restriction: a fixed id or an exact name.
    pub classification: Option<String>,
    /// Employment type token, e.g. `casual`.
    pub employment_type: Option<String>,
    /// Day type token, e.g. `sunday`.
    pub day_type: Option<String>,
    /// Shift type token, e.g. `night`.
    pub shift_type: Option<String>,
    /// Age category token, e.g. `junior_16` or `adult`.
    pub age_category: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    /// Rows per page, capped at the store maximum.
    pub page_size: Option<usize>,
}

/// Query parameters for the `/rules` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesQuery {
    /// Rule type token, e.g. `SIMPLE`.
    pub rule_type: Option<String>,
    /// Rule category token, e.g. `PAY_RATE`.
    pub category: Option<String>,
    /// Filter on the active flag.
    pub active: Option<bool>,
}

/// Query parameters for the `/logs/rules` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleLogsQuery {
    /// Narrow the listing to a single execution.
    pub execution_id: Option<Uuid>,
}

/// Query parameters for the `/rules/export` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    /// Scope the export to rules exercised against one award.
    pub award_code: Option<String>,
    /// Restrict the export to one rule type token.
    pub rule_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_request_accepts_empty_body() {
        let request: CompileRequest = serde_json::from_str("{}").unwrap();
        assert!(request.award_code.is_none());
    }

    #[test]
    fn test_calculate_request_defaults_resume_off() {
        let request: CalculateRequest =
            serde_json::from_str(r#"{"award_code": "MA000018"}"#).unwrap();
        assert_eq!(request.award_code.as_deref(), Some("MA000018"));
        assert!(request.classification.is_none());
        assert!(!request.resume);
    }

    #[test]
    fn test_calculate_request_parses_classification() {
        let request: CalculateRequest =
            serde_json::from_str(r#"{"award_code": "MA000018", "classification": 101}"#).unwrap();
        assert_eq!(request.classification, Some(101));
    }

    #[test]
    fn test_apply_rule_request_requires_both_codes() {
        let result: Result<ApplyRuleRequest, _> =
            serde_json::from_str(r#"{"rule_code": "BASE_RATE_MINIMUM"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rates_query_parses_pagination() {
        let query: RatesQuery = serde_json::from_str(r#"{"page": 2, "page_size": 100}"#).unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.page_size, Some(100));
    }
}
