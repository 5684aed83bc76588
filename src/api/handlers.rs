//! HTTP request handlers for the award compilation API.
//!
//! This module contains the handler functions for all API endpoints.
//! Command endpoints (compile, calculate, rule seeding and application)
//! run on the blocking pool; read endpoints answer from the store inline.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::CalculationScope;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::store::{AwardFilter, DEFAULT_PAGE_SIZE, DetailFilter, Page, RateFilter, RuleFilter};

use super::request::{
    ApplyRuleRequest, AwardsQuery, CalculateRequest, CompileRequest, DetailsQuery, ExportQuery,
    RatesQuery, RuleLogsQuery, RulesQuery,
};
use super::response::{
    ApiError, ApiErrorResponse, AwardListResponse, DetailListResponse, RatePageResponse,
    RuleListResponse, RuleLogListResponse, RunLogListResponse, SeedRulesResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/compile/summary", post(compile_summary_handler))
        .route("/compile/detail", post(compile_detail_handler))
        .route("/calculate", post(calculate_handler))
        .route("/awards", get(list_awards_handler))
        .route("/awards/:code/details", get(award_details_handler))
        .route("/rates", get(list_rates_handler))
        .route("/rules", get(list_rules_handler))
        .route("/rules/seed", post(seed_rules_handler))
        .route("/rules/apply", post(apply_rule_handler))
        .route("/rules/export", get(export_rules_handler))
        .route("/logs/rules", get(rule_logs_handler))
        .route("/logs/runs", get(run_logs_handler))
        .with_state(state)
}

/// Renders a success body with an explicit JSON content type.
fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Renders a mapped engine error.
fn json_error(error: ApiErrorResponse) -> Response {
    (
        error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error.error),
    )
        .into_response()
}

/// Renders a request-shape error as a 400.
fn bad_request(error: ApiError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

/// Maps a body rejection onto the API error vocabulary.
fn rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            // Check if it's a missing field error
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Unwraps a query extraction, rendering rejections as a 400.
fn unwrap_query<T>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, Response> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection,
                "Query string rejected"
            );
            Err(bad_request(ApiError::new(
                "INVALID_QUERY",
                format!("Failed to parse query string: {rejection}"),
            )))
        }
    }
}

/// Parses a filter token into its enum through the serde vocabulary,
/// so query strings and stored rows accept exactly the same spellings.
fn parse_token<T: serde::de::DeserializeOwned>(
    field: &str,
    value: Option<&str>,
) -> EngineResult<Option<T>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    serde_json::from_value(Value::String(raw.to_string()))
        .map(Some)
        .map_err(|_| EngineError::InvalidFilter {
            field: field.to_string(),
            message: format!("unrecognized value '{raw}'"),
        })
}

/// Runs a synchronous engine command on the blocking pool.
async fn run_command<T, F>(
    correlation_id: Uuid,
    label: &'static str,
    task: F,
) -> Result<T, ApiErrorResponse>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                task = label,
                error = %err,
                "Command failed"
            );
            Err(err.into())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                task = label,
                error = %err,
                "Command task aborted"
            );
            Err(ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", format!("{label} task aborted")),
            })
        }
    }
}

/// Handler for the GET /health endpoint.
async fn health_handler() -> impl IntoResponse {
    json_ok(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handler for the POST /compile/summary endpoint.
///
/// Compiles staged awards into summary rows; an empty body compiles
/// every staged award.
async fn compile_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(correlation_id, rejection)),
    };
    info!(
        correlation_id = %correlation_id,
        award_code = ?request.award_code,
        "Processing summary compile request"
    );

    let engine = state.engine_handle();
    match run_command(correlation_id, "summary compile", move || {
        engine.compile_awards_summary(request.award_code.as_deref())
    })
    .await
    {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                status = %outcome.status,
                records = outcome.records_compiled,
                "Summary compile completed"
            );
            json_ok(outcome)
        }
        Err(err) => json_error(err),
    }
}

/// Handler for the POST /compile/detail endpoint.
async fn compile_detail_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(correlation_id, rejection)),
    };
    info!(
        correlation_id = %correlation_id,
        award_code = ?request.award_code,
        "Processing detail compile request"
    );

    let engine = state.engine_handle();
    match run_command(correlation_id, "detail compile", move || {
        engine.compile_awards_detailed(request.award_code.as_deref())
    })
    .await
    {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                status = %outcome.status,
                records = outcome.total_records,
                "Detail compile completed"
            );
            json_ok(outcome)
        }
        Err(err) => json_error(err),
    }
}

/// Handler for the POST /calculate endpoint.
///
/// Enumerates the combination space for the awards in scope and writes
/// one calculated rate row per combination.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(correlation_id, rejection)),
    };
    info!(
        correlation_id = %correlation_id,
        award_code = ?request.award_code,
        classification = ?request.classification,
        resume = request.resume,
        "Processing calculation request"
    );

    let scope = CalculationScope {
        award_code: request.award_code,
        classification: request.classification,
        resume: request.resume,
    };
    let engine = state.engine_handle();
    match run_command(correlation_id, "rate calculation", move || {
        engine.calculate_all_pay_rates(&scope)
    })
    .await
    {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                status = %outcome.status,
                records = outcome.total_records_created,
                awards = outcome.awards_processed,
                skipped = outcome.awards_skipped,
                "Calculation completed"
            );
            json_ok(outcome)
        }
        Err(err) => json_error(err),
    }
}

/// Handler for the POST /rules/seed endpoint.
async fn seed_rules_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rule seed request");

    let engine = state.engine_handle();
    match run_command(correlation_id, "rule seed", move || {
        engine.initialize_basic_rules()
    })
    .await
    {
        Ok(created) => json_ok(SeedRulesResponse { created }),
        Err(err) => json_error(err),
    }
}

/// Handler for the POST /rules/apply endpoint.
///
/// Executes one catalog rule against one compiled award. The HTTP call
/// succeeds whenever the execution was recorded; the evaluation result
/// travels in the outcome body, including ERROR outcomes for unknown
/// rule or award codes.
async fn apply_rule_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRuleRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_request(rejection_error(correlation_id, rejection)),
    };
    info!(
        correlation_id = %correlation_id,
        rule_code = %request.rule_code,
        award_code = %request.award_code,
        "Processing rule application request"
    );

    let engine = state.engine_handle();
    match run_command(correlation_id, "rule application", move || {
        engine.apply_rule(&request.rule_code, &request.award_code)
    })
    .await
    {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                status = %outcome.status,
                execution_id = %outcome.execution_id,
                "Rule application completed"
            );
            json_ok(outcome)
        }
        Err(err) => json_error(err),
    }
}

/// Handler for the GET /awards endpoint.
async fn list_awards_handler(
    State(state): State<AppState>,
    query: Result<Query<AwardsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    let filter = AwardFilter {
        code: query.code,
        industry: query.industry,
        active: query.active,
    };
    match state.engine().award_summaries(&filter) {
        Ok(awards) => json_ok(AwardListResponse {
            count: awards.len(),
            awards,
        }),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Award listing failed");
            json_error(err.into())
        }
    }
}

/// Handler for the GET /awards/:code/details endpoint.
async fn award_details_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    query: Result<Query<DetailsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match award_details(state.engine(), code, query) {
        Ok(response) => json_ok(response),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Detail listing failed");
            json_error(err.into())
        }
    }
}

/// Resolves the detail listing, rejecting awards with no compiled summary.
fn award_details(
    engine: &Engine,
    code: String,
    query: DetailsQuery,
) -> EngineResult<DetailListResponse> {
    let compiled = engine.award_summaries(&AwardFilter {
        code: Some(code.clone()),
        ..AwardFilter::default()
    })?;
    if compiled.is_empty() {
        return Err(EngineError::AwardNotFound { code });
    }

    let filter = DetailFilter {
        award_code: Some(code.clone()),
        record_type: parse_token("record_type", query.record_type.as_deref())?,
        classification: query.classification,
    };
    let details = engine.award_details(&filter)?;
    Ok(DetailListResponse {
        award_code: code,
        count: details.len(),
        details,
    })
}

/// Handler for the GET /rates endpoint.
async fn list_rates_handler(
    State(state): State<AppState>,
    query: Result<Query<RatesQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match rate_listing(state.engine(), query) {
        Ok(response) => json_ok(response),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rate listing failed");
            json_error(err.into())
        }
    }
}

/// Builds the rate filter and page from raw query tokens and runs the query.
fn rate_listing(engine: &Engine, query: RatesQuery) -> EngineResult<RatePageResponse> {
    let filter = RateFilter {
        award_code: query.award_code,
        classification: query.classification,
        employment_type: parse_token("employment_type", query.employment_type.as_deref())?,
        day_type: parse_token("day_type", query.day_type.as_deref())?,
        shift_type: parse_token("shift_type", query.shift_type.as_deref())?,
        age_category: parse_token("age_category", query.age_category.as_deref())?,
    };
    let page = Page {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    Ok(engine.calculated_rates(&filter, page)?.into())
}

/// Handler for the GET /rules endpoint.
async fn list_rules_handler(
    State(state): State<AppState>,
    query: Result<Query<RulesQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match rule_listing(state.engine(), query) {
        Ok(response) => json_ok(response),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rule listing failed");
            json_error(err.into())
        }
    }
}

fn rule_listing(engine: &Engine, query: RulesQuery) -> EngineResult<RuleListResponse> {
    let filter = RuleFilter {
        rule_type: parse_token("rule_type", query.rule_type.as_deref())?,
        category: parse_token("category", query.category.as_deref())?,
        active: query.active,
    };
    let rules = engine.rules(&filter)?;
    Ok(RuleListResponse {
        count: rules.len(),
        rules,
    })
}

/// Handler for the GET /rules/export endpoint.
async fn export_rules_handler(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match rule_export(state.engine(), query) {
        Ok(export) => json_ok(export),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rule export failed");
            json_error(err.into())
        }
    }
}

fn rule_export(engine: &Engine, query: ExportQuery) -> EngineResult<Value> {
    let rule_type = parse_token("rule_type", query.rule_type.as_deref())?;
    engine.award_rules_json(query.award_code.as_deref(), rule_type)
}

/// Handler for the GET /logs/rules endpoint.
async fn rule_logs_handler(
    State(state): State<AppState>,
    query: Result<Query<RuleLogsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let query = match unwrap_query(correlation_id, query) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match state.engine().rule_execution_logs(query.execution_id) {
        Ok(logs) => json_ok(RuleLogListResponse {
            count: logs.len(),
            logs,
        }),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Rule log listing failed");
            json_error(err.into())
        }
    }
}

/// Handler for the GET /logs/runs endpoint.
async fn run_logs_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    match state.engine().compile_run_logs() {
        Ok(logs) => json_ok(RunLogListResponse {
            count: logs.len(),
            logs,
        }),
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Run log listing failed");
            json_error(err.into())
        }
    }
}
