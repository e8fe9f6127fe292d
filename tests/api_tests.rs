//! API integration tests: requests are sent through the router in-process

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use report_normalizer::api::handlers::ApiResponse;
use report_normalizer::api::{build_router, AppState};
use report_normalizer::config::NormalizerConfig;
use report_normalizer::excel::{load_workbook, save_workbook};
use report_normalizer::{CellRef, CellValue, Workbook};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> Router {
    app_with(NormalizerConfig::default())
}

fn app_with(config: NormalizerConfig) -> Router {
    build_router(Arc::new(AppState::new(config)))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    post_to(app(), uri, body).await
}

async fn post_to(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSE ENVELOPE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_api_response_serialization_skips_empty_fields() {
    let response: ApiResponse<String> = ApiResponse::err("boom");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "boom");
    assert!(json.get("data").is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_version() {
    let (status, body) = get("/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (_, body) = get("/").await;
    let paths: Vec<&str> = body["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/v1/normalize"));
    assert!(paths.contains(&"/api/v1/plan"));
}

// ═══════════════════════════════════════════════════════════════════════════
// MONTHS ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_months() {
    let (status, body) = post(
        "/api/v1/months",
        json!({"run_month": "202403", "tag": "30+DPD @ 75 DOB"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["psi_month"], "202402");
    assert_eq!(body["data"]["approved_month"], "202312");
}

#[tokio::test]
async fn test_months_invalid_run_month() {
    let (status, body) = post("/api/v1/months", json!({"run_month": "March"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid run month"));
}

// ═══════════════════════════════════════════════════════════════════════════
// NORMALIZE / ALERTS ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

fn write_report(temp: &TempDir) -> String {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("Overview");
    sheet.set(1, 1, "Car");
    sheet.set(1, 2, "Coupe");
    sheet.set(2, 1, "Class: Prime");
    sheet.set(14, 2, 202402i64);
    sheet.set(25, 1, "Summary");
    sheet.set(25, 2, "Red");

    let path = temp.path().join("report.xlsx");
    save_workbook(&workbook, &path).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_normalize_endpoint() {
    let temp = TempDir::new().unwrap();
    let file_path = write_report(&temp);
    let out_dir = temp.path().join("out");

    let (status, body) = post(
        "/api/v1/normalize",
        json!({"file_path": file_path, "output_dir": out_dir}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["alerts"]["has_alerts"], true);

    let output = out_dir.join("Coupe_Prime.xlsx");
    assert_eq!(body["data"]["output"], &*output.to_string_lossy());

    let saved = load_workbook(&output).unwrap();
    let sheet = saved.sheet("Overview").unwrap();
    assert_eq!(sheet.get_ref(CellRef::new(17, 2)), &CellValue::from("Feb-24"));
}

#[tokio::test]
async fn test_normalize_missing_file() {
    let temp = TempDir::new().unwrap();
    let (status, body) = post(
        "/api/v1/normalize",
        json!({"file_path": temp.path().join("missing.xlsx")}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_alerts_endpoint() {
    let temp = TempDir::new().unwrap();
    let file_path = write_report(&temp);

    let (status, body) = post("/api/v1/alerts", json!({"file_path": file_path})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], "Red");
    assert_eq!(
        body["data"]["alert_details"][0],
        "Summary contains alert: Red"
    );
}

#[tokio::test]
async fn test_server_config_reaches_handlers() {
    let temp = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_sheet("Cover");
    sheet.set(1, 1, "Summary");
    sheet.set(1, 6, "Yellow");
    sheet.set(14, 2, "First production month");
    let accuracy = workbook.add_sheet("Accuracy");
    accuracy.set(1, 2, "Vintage");
    accuracy.set(2, 1, "Benchmark");
    accuracy.set(2, 2, 202208i64);
    let file_path = temp.path().join("cover.xlsx");
    save_workbook(&workbook, &file_path).unwrap();

    let (_, body) = post("/api/v1/alerts", json!({"file_path": file_path})).await;
    assert_eq!(body["data"]["has_alerts"], false);

    let mut config = NormalizerConfig::default();
    config.alerts.look_ahead = 5;
    config.overview_sheet = "cover".to_string();
    config.vintage_cells = vec![CellRef::new(14, 2)];

    let (_, body) = post_to(
        app_with(config.clone()),
        "/api/v1/alerts",
        json!({"file_path": file_path}),
    )
    .await;
    assert_eq!(body["data"]["summary"], "Yellow");

    let output = temp.path().join("out.xlsx");
    let (status, body) = post_to(
        app_with(config),
        "/api/v1/normalize",
        json!({"file_path": file_path, "output_path": output}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let saved = load_workbook(&output).unwrap();
    let cover = saved.sheet("Cover").unwrap();
    assert_eq!(cover.get_ref(CellRef::new(14, 2)), &CellValue::from("Aug-22"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PLAN ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_plan_endpoint() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("models.yaml");
    std::fs::write(
        &config_path,
        "models:\n  - model_name: NTPP2\n    tag1: model_bad_tag\n    segments:\n      - segment: \"US:Overall\"\n        tag: \"60+DPD @ 180 DOB\"\n",
    )
    .unwrap();

    let (status, body) = post(
        "/api/v1/plan",
        json!({"config_path": config_path, "run_month": "202406"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let request = &body["data"][0]["request"];
    assert_eq!(request["model_name"], "NTPP2");
    assert_eq!(request["psi_month"], "202405");
    assert_eq!(request["approved_month1"], "202402");
}
