//! End-to-end tests for the award compilation API.
//!
//! This suite drives the HTTP surface over the shipped MA000018 staging
//! dataset and engine configuration, covering:
//! - Summary and detail compilation with their fan-out counts
//! - Pay-rate calculation across the full combination space
//! - Staged rate arithmetic (casual loading, junior percentages,
//!   penalties, all-purpose allowance folding, weekly conversion)
//! - Rate queries with axis filters and pagination
//! - Rule catalog seeding, application, export, and audit logs
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use award_compiler::api::{AppState, create_router};
use award_compiler::config::ConfigLoader;
use award_compiler::engine::Engine;
use award_compiler::staging::StagingLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/engine.yaml")
        .expect("Failed to load config")
        .into_config();
    let dataset = StagingLoader::load_root("./staging")
        .expect("Failed to load staging data")
        .into_dataset();
    let engine = Engine::new(config);
    engine
        .load_staging(dataset)
        .expect("Failed to stage dataset");
    AppState::new(engine)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    let d = Decimal::from_str(s).unwrap();
    d.normalize().to_string()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("Content-Type", "application/json");
    }
    let request = builder
        .body(Body::from(
            body.map(|b| b.to_string()).unwrap_or_default(),
        ))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, Some(body)).await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, None).await
}

/// Compiles summaries, details, and rates so read tests have data.
async fn compile_everything(router: &Router) {
    let (status, _) = post(router, "/compile/summary", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(router, "/compile/detail", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(router, "/calculate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

fn assert_decimal_field(row: &Value, field: &str, expected: &str) {
    let actual = row[field]
        .as_str()
        .unwrap_or_else(|| panic!("field {field} missing or not a string in {row}"));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {field} {expected}, got {actual}"
    );
}

/// Fetches exactly one calculated rate row for the given axis filters.
async fn fetch_rate(router: &Router, query: &str) -> Value {
    let uri = format!("/rates?award_code=MA000018&{query}");
    let (status, body) = get(router, &uri).await;
    assert_eq!(status, StatusCode::OK, "rate query failed: {body}");
    assert_eq!(
        body["count"], 1,
        "expected exactly one row for {query}, got {}",
        body["count"]
    );
    body["rates"][0].clone()
}

// =============================================================================
// SECTION 1: Health and request validation
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_router_for_test();

    let (status, body) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let router = create_router_for_test();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compile/summary")
                .header("Content-Type", "application/json")
                .body(Body::from("{invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_required_field_returns_400() {
    let router = create_router_for_test();

    let (status, error) = post(&router, "/rules/apply", json!({"award_code": "MA000018"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(
        error["message"].as_str().unwrap().contains("rule_code"),
        "Expected the missing field to be named, got: {}",
        error["message"]
    );
}

#[tokio::test]
async fn test_scoped_compile_for_unknown_award_returns_404() {
    let router = create_router_for_test();

    let (status, error) = post(
        &router,
        "/compile/summary",
        json!({"award_code": "MA099999"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "AWARD_NOT_FOUND");
    assert!(error["message"].as_str().unwrap().contains("MA099999"));
}

// =============================================================================
// SECTION 2: Summary compilation
// =============================================================================

#[tokio::test]
async fn test_summary_compile_counts_staged_relations() {
    let router = create_router_for_test();

    let (status, outcome) = post(&router, "/compile/summary", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");
    assert_eq!(outcome["records_compiled"], 1);
    assert_eq!(outcome["awards_processed"], 1);
    assert_eq!(outcome["awards_failed"], 0);
}

#[tokio::test]
async fn test_summary_rows_expose_rate_statistics() {
    let router = create_router_for_test();
    post(&router, "/compile/summary", json!({})).await;

    let (status, body) = get(&router, "/awards").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let award = &body["awards"][0];
    assert_eq!(award["award_code"], "MA000018");
    assert_eq!(award["award_name"], "Aged Care Award 2010");
    assert_eq!(award["industry"], "Health and welfare services");
    assert_eq!(award["total_classifications"], 3);
    assert_eq!(award["total_pay_rates"], 5);
    assert_eq!(award["total_expense_allowances"], 2);
    assert_eq!(award["total_wage_allowances"], 2);
    // Across all five staged rate rows, including junior and casual.
    assert_decimal_field(award, "min_base_rate", "12.49");
    assert_decimal_field(award, "max_base_rate", "1007.50");
    // (24.98 + 25.51 + 1007.50 + 12.49 + 25.51) / 5 = 219.198
    assert_decimal_field(award, "avg_base_rate", "219.198");
    assert_eq!(award["version_number"], 5);
    assert_eq!(award["is_active"], true);
}

#[tokio::test]
async fn test_award_filters_on_industry_and_code() {
    let router = create_router_for_test();
    post(&router, "/compile/summary", json!({})).await;

    let (_, body) = get(&router, "/awards?industry=welfare").await;
    assert_eq!(body["count"], 1);

    let (_, body) = get(&router, "/awards?code=MA099999").await;
    assert_eq!(body["count"], 0);
}

// =============================================================================
// SECTION 3: Detail compilation
// =============================================================================

#[tokio::test]
async fn test_detail_compile_fans_out_per_relation() {
    let router = create_router_for_test();

    let (status, outcome) = post(&router, "/compile/detail", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");
    // 3 classifications + 5 pay rates + 2 expense + 2 wage allowances.
    assert_eq!(outcome["total_records"], 12);
    assert_eq!(outcome["base_records"], 1);
    assert_eq!(outcome["classification_records"], 3);
    assert_eq!(outcome["pay_rate_records"], 5);
    assert_eq!(outcome["expense_records"], 2);
    assert_eq!(outcome["wage_records"], 2);
}

#[tokio::test]
async fn test_detail_listing_filters_by_record_type() {
    let router = create_router_for_test();
    post(&router, "/compile/summary", json!({})).await;
    post(&router, "/compile/detail", json!({})).await;

    let (status, body) = get(&router, "/awards/MA000018/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["award_code"], "MA000018");
    assert_eq!(body["count"], 12);

    let (_, body) = get(&router, "/awards/MA000018/details?record_type=WAGE_ALLOWANCE").await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["details"][0]["record_type"], "WAGE_ALLOWANCE");

    // Fixed id 101: its classification row plus its two pay-rate rows.
    let (_, body) = get(&router, "/awards/MA000018/details?classification=101").await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_detail_listing_for_uncompiled_award_returns_404() {
    let router = create_router_for_test();

    let (status, error) = get(&router, "/awards/MA000018/details").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "AWARD_NOT_FOUND");
}

// =============================================================================
// SECTION 4: Rate calculation
// =============================================================================

#[tokio::test]
async fn test_calculation_enumerates_the_combination_space() {
    let router = create_router_for_test();

    let (status, outcome) = post(&router, "/calculate", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");
    // 3 classifications x 3 employment types x 4 day types x 3 shift
    // types x 7 age categories (adult + six junior bands).
    assert_eq!(outcome["total_records_created"], 756);
    assert_eq!(outcome["awards_processed"], 1);
    assert_eq!(outcome["awards_skipped"], 0);
    assert_eq!(outcome["classifications_processed"], 3);
    assert_eq!(outcome["full_time_rates"], 252);
    assert_eq!(outcome["part_time_rates"], 252);
    assert_eq!(outcome["casual_rates"], 252);
}

#[tokio::test]
async fn test_casual_sunday_rate_stages_in_order() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    let row = fetch_rate(
        &router,
        "classification=101&employment_type=casual&day_type=sunday&shift_type=ordinary&age_category=adult",
    )
    .await;

    // 24.98 x 1.25 = 31.2250, x 1.75 = 54.6438, + 0.52 leading hand = 55.1638
    assert_decimal_field(&row, "base_rate", "24.98");
    assert_decimal_field(&row, "casual_loaded_rate", "31.2250");
    assert_decimal_field(&row, "penalty_adjusted_rate", "54.6438");
    assert_decimal_field(&row, "calculated_hourly_rate", "55.1638");
    assert_eq!(row["applicable_allowance_ids"], json!([301]));
    assert_decimal_field(&row, "applicable_allowance_total", "0.52");
    // Meal, laundry, and qualification allowances are listed, not folded;
    // only the weekly qualification amount converts: 33.08 / 38 = 0.8705.
    assert_eq!(row["other_allowance_ids"], json!([201, 202, 302]));
    assert_decimal_field(&row, "other_allowance_total", "0.8705");

    let steps = row["calculation_steps"].as_str().unwrap();
    assert!(steps.starts_with("base rate (Hourly): $24.98"));
    assert!(steps.contains("casual loading 25%"));
    assert!(steps.contains("Sunday penalty x1.75"));
    assert!(steps.contains("all-purpose allowance Leading hand allowance"));
    assert!(steps.ends_with("calculated hourly rate: $55.16"));

    // Clause references survive from config and staging.
    assert_eq!(row["casual_clause"], "10.4");
    assert_eq!(row["penalty_clause"], "Sunday work - ordinary hours");
}

#[tokio::test]
async fn test_junior_percentages_stack_on_casual_loading() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    // Full-time junior: 24.98 x 0.50 + 0.52 = 13.01
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=full_time&day_type=weekday&shift_type=ordinary&age_category=junior_16",
    )
    .await;
    assert_decimal_field(&row, "junior_percentage_applied", "0.50");
    assert_decimal_field(&row, "calculated_hourly_rate", "13.01");

    // Casual junior stacks: 24.98 x 1.25 = 31.2250, x 0.50 = 15.6125,
    // + 0.52 = 16.1325
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=casual&day_type=weekday&shift_type=ordinary&age_category=junior_16",
    )
    .await;
    assert_decimal_field(&row, "casual_loaded_rate", "31.2250");
    assert_decimal_field(&row, "junior_adjusted_rate", "15.6125");
    assert_decimal_field(&row, "calculated_hourly_rate", "16.1325");
}

#[tokio::test]
async fn test_weekly_base_rate_converts_to_hourly() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    let row = fetch_rate(
        &router,
        "classification=103&employment_type=full_time&day_type=weekday&shift_type=ordinary&age_category=adult",
    )
    .await;

    // 1007.50 / 38 = 26.5132, + 0.52 leading hand = 27.0332
    assert_decimal_field(&row, "base_rate", "26.5132");
    assert_eq!(row["base_rate_type"], "Weekly");
    assert_decimal_field(&row, "calculated_hourly_rate", "27.0332");
    assert!(
        row["calculation_steps"]
            .as_str()
            .unwrap()
            .starts_with("base rate (Weekly): $26.51")
    );
}

#[tokio::test]
async fn test_penalty_selection_across_day_and_shift() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    // Flat night loading: 24.98 + 3.58 = 28.56, + 0.52 = 29.08
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=full_time&day_type=weekday&shift_type=night&age_category=adult",
    )
    .await;
    assert_decimal_field(&row, "penalty_flat_amount_applied", "3.58");
    assert_decimal_field(&row, "calculated_hourly_rate", "29.08");

    // Afternoon multiplier: 24.98 x 1.125 = 28.1025, + 0.52 = 28.6225
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=full_time&day_type=weekday&shift_type=afternoon&age_category=adult",
    )
    .await;
    assert_decimal_field(&row, "penalty_multiplier_applied", "1.125");
    assert_decimal_field(&row, "calculated_hourly_rate", "28.6225");

    // Saturday keeps its day penalty on night shifts; the night loading
    // is pinned to weekdays. 24.98 x 1.50 = 37.47, + 0.52 = 37.99
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=full_time&day_type=saturday&shift_type=night&age_category=adult",
    )
    .await;
    assert_decimal_field(&row, "penalty_multiplier_applied", "1.50");
    assert_decimal_field(&row, "calculated_hourly_rate", "37.99");

    // Public holiday: 24.98 x 2.50 = 62.45, + 0.52 = 62.97
    let row = fetch_rate(
        &router,
        "classification=101&employment_type=full_time&day_type=public_holiday&shift_type=ordinary&age_category=adult",
    )
    .await;
    assert_decimal_field(&row, "calculated_hourly_rate", "62.97");
}

#[tokio::test]
async fn test_resume_skips_awards_with_active_rates() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    let (status, outcome) = post(&router, "/calculate", json!({"resume": true})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");
    assert_eq!(outcome["awards_skipped"], 1);
    assert_eq!(outcome["total_records_created"], 0);
}

#[tokio::test]
async fn test_classification_scoped_calculation() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    let (status, outcome) = post(
        &router,
        "/calculate",
        json!({"award_code": "MA000018", "classification": 101}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");
    assert_eq!(outcome["classifications_processed"], 1);
    assert_eq!(outcome["total_records_created"], 252);

    // The scoped rerun replaced the award's whole generation.
    let (_, body) = get(&router, "/rates?award_code=MA000018&page_size=500").await;
    assert_eq!(body["total_records"], 252);
    let rates = body["rates"].as_array().unwrap();
    assert!(rates.iter().all(|r| r["classification_fixed_id"] == 101));
}

#[tokio::test]
async fn test_recalculation_replaces_prior_rows() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;
    post(&router, "/calculate", json!({})).await;

    let (_, body) = get(&router, "/rates?award_code=MA000018&page_size=1").await;

    // A rerun replaces the award's rows instead of appending.
    assert_eq!(body["total_records"], 756);
}

// =============================================================================
// SECTION 5: Rate queries
// =============================================================================

#[tokio::test]
async fn test_rate_pagination_pages_through_the_space() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    let (_, body) = get(&router, "/rates?award_code=MA000018").await;
    assert_eq!(body["count"], 50); // default page size
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_records"], 756);

    let (_, body) = get(&router, "/rates?award_code=MA000018&page=16&page_size=50").await;
    assert_eq!(body["count"], 6); // 756 - 15 * 50
}

#[tokio::test]
async fn test_rate_page_size_over_cap_returns_400() {
    let router = create_router_for_test();

    let (status, error) = get(&router, "/rates?page_size=501").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_FILTER");
    assert!(error["message"].as_str().unwrap().contains("page_size"));
}

#[tokio::test]
async fn test_rate_filter_rejects_unknown_tokens() {
    let router = create_router_for_test();

    let (status, error) = get(&router, "/rates?age_category=junior_25").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_FILTER");
    assert!(error["message"].as_str().unwrap().contains("junior_25"));
}

#[tokio::test]
async fn test_rate_filters_combine_across_axes() {
    let router = create_router_for_test();
    post(&router, "/calculate", json!({})).await;

    // One classification, all casual rows: 4 days x 3 shifts x 7 ages.
    let (_, body) = get(
        &router,
        "/rates?award_code=MA000018&classification=101&employment_type=casual",
    )
    .await;
    assert_eq!(body["total_records"], 84);

    // Name restriction matches exactly, case-insensitively.
    let (_, body) = get(
        &router,
        "/rates?classification=aged%20care%20employee%20-%20level%201&employment_type=casual",
    )
    .await;
    assert_eq!(body["total_records"], 84);
}

// =============================================================================
// SECTION 6: Rule catalog
// =============================================================================

#[tokio::test]
async fn test_seed_rules_is_idempotent() {
    let router = create_router_for_test();

    let (status, body) = post(&router, "/rules/seed", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);

    let (_, body) = post(&router, "/rules/seed", json!({})).await;
    assert_eq!(body["created"], false);

    let (_, body) = get(&router, "/rules").await;
    assert_eq!(body["count"], 12);
    // Highest priority first.
    assert_eq!(body["rules"][0]["rule_code"], "BASE_RATE_MINIMUM");
}

#[tokio::test]
async fn test_rule_listing_filters_by_type_and_category() {
    let router = create_router_for_test();
    post(&router, "/rules/seed", json!({})).await;

    let (_, body) = get(&router, "/rules?rule_type=SIMPLE").await;
    assert_eq!(body["count"], 6);

    let (_, body) = get(&router, "/rules?category=PAY_RATE").await;
    assert_eq!(body["count"], 4);

    let (status, error) = get(&router, "/rules?rule_type=TRIVIAL").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_FILTER");
}

#[tokio::test]
async fn test_rule_application_over_compiled_data() {
    let router = create_router_for_test();
    compile_everything(&router).await;
    post(&router, "/rules/seed", json!({})).await;

    // All adult hourly rates (24.98, 25.51, 26.5132) clear the 24.10
    // floor; the junior row is exempt.
    let (status, outcome) = post(
        &router,
        "/rules/apply",
        json!({"rule_code": "BASE_RATE_MINIMUM", "award_code": "MA000018"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "SUCCESS");

    // The staged casual derivation 31.89 exceeds its base 25.51.
    let (_, outcome) = post(
        &router,
        "/rules/apply",
        json!({"rule_code": "CASUAL_RATE_LOADED", "award_code": "MA000018"}),
    )
    .await;
    assert_eq!(outcome["status"], "SUCCESS");

    // Summary counts agree with the detail fan-out.
    let (_, outcome) = post(
        &router,
        "/rules/apply",
        json!({"rule_code": "SUMMARY_DETAIL_CONSISTENT", "award_code": "MA000018"}),
    )
    .await;
    assert_eq!(outcome["status"], "SUCCESS");
}

#[tokio::test]
async fn test_rule_application_records_error_outcomes() {
    let router = create_router_for_test();
    compile_everything(&router).await;
    post(&router, "/rules/seed", json!({})).await;

    // Unknown rule: the execution is still recorded, the transport
    // succeeds, and the outcome carries ERROR.
    let (status, outcome) = post(
        &router,
        "/rules/apply",
        json!({"rule_code": "NO_SUCH_RULE", "award_code": "MA000018"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "ERROR");
    assert!(
        outcome["error_message"]
            .as_str()
            .unwrap()
            .contains("NO_SUCH_RULE")
    );

    let execution_id = outcome["execution_id"].as_str().unwrap().to_string();
    let (_, body) = get(&router, &format!("/logs/rules?execution_id={execution_id}")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["logs"][0]["execution_status"], "ERROR");
}

#[tokio::test]
async fn test_rule_export_scopes_and_filters() {
    let router = create_router_for_test();
    compile_everything(&router).await;
    post(&router, "/rules/seed", json!({})).await;

    let (status, export) = get(&router, "/rules/export").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["rule_count"], 12);
    assert!(export["generated_at"].is_string());

    let (_, export) = get(&router, "/rules/export?rule_type=COMPLEX").await;
    assert_eq!(export["rule_count"], 6);

    let (_, export) = get(&router, "/rules/export?award_code=MA000018").await;
    assert_eq!(export["award_code"], "MA000018");

    let (status, error) = get(&router, "/rules/export?award_code=MA099999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "AWARD_NOT_FOUND");
}

#[tokio::test]
async fn test_rule_execution_log_accumulates() {
    let router = create_router_for_test();
    compile_everything(&router).await;
    post(&router, "/rules/seed", json!({})).await;

    post(
        &router,
        "/rules/apply",
        json!({"rule_code": "BASE_RATE_MINIMUM", "award_code": "MA000018"}),
    )
    .await;
    post(
        &router,
        "/rules/apply",
        json!({"rule_code": "RATE_PROGRESSION", "award_code": "MA000018"}),
    )
    .await;

    let (status, body) = get(&router, "/logs/rules").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let codes: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["rule_code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"BASE_RATE_MINIMUM"));
    assert!(codes.contains(&"RATE_PROGRESSION"));
}

// =============================================================================
// SECTION 7: Run logs
// =============================================================================

#[tokio::test]
async fn test_run_logs_record_each_command() {
    let router = create_router_for_test();
    compile_everything(&router).await;

    let (status, body) = get(&router, "/logs/runs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let operations: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["operation"].as_str().unwrap())
        .collect();
    assert!(operations.contains(&"SUMMARY_COMPILE"));
    assert!(operations.contains(&"DETAIL_COMPILE"));
    assert!(operations.contains(&"RATE_CALCULATION"));
    for log in body["logs"].as_array().unwrap() {
        assert_eq!(log["status"], "SUCCESS");
    }
}
