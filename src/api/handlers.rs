//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ModelCatalog, DEFAULT_OUTPUT_DIR};
use crate::core::alerts::scan_for_alerts_with;
use crate::core::dates::{derive_approved_month, RunMonth};
use crate::error::{ReportError, ReportResult};
use crate::excel::load_workbook;
use crate::report::{process_report, ProcessOptions, ProcessedReport};
use crate::request::{plan_requests, PlannedRequest};
use crate::types::AlertReport;

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// 200 with data, or 400 carrying the error message
fn respond<T: Serialize>(result: ReportResult<T>) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

/// Run file-bound work off the async executor
async fn blocking<T, F>(work: F) -> ReportResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ReportResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ReportError::Validation(format!("worker failed: {}", e)))?
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Report Normalizer API".to_string(),
        version: state.version.clone(),
        description: "Normalizes model-monitoring report workbooks".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/normalize", "POST", "Normalize a report workbook"),
            endpoint("/api/v1/alerts", "POST", "Scan a report for red/yellow alerts"),
            endpoint("/api/v1/months", "POST", "PSI and approved months for a run month"),
            endpoint("/api/v1/plan", "POST", "Download requests for the model catalog"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["normalize", "alerts", "months", "plan"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }))
}

/// Normalize request
#[derive(Deserialize)]
pub struct NormalizeRequest {
    pub file_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

/// POST /api/v1/normalize - Normalize a report workbook
pub async fn normalize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NormalizeRequest>,
) -> impl IntoResponse {
    let options = ProcessOptions {
        output: req.output_path.map(PathBuf::from),
        output_dir: PathBuf::from(req.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
        model_name: req.model_name,
        segment: req.segment,
        config: state.config.clone(),
    };
    let input = PathBuf::from(req.file_path);

    let result: ReportResult<ProcessedReport> =
        blocking(move || process_report(&input, &options)).await;
    respond(result)
}

/// Alerts request
#[derive(Deserialize)]
pub struct AlertsRequest {
    pub file_path: String,
}

/// POST /api/v1/alerts - Scan a report without modifying it
pub async fn alerts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlertsRequest>,
) -> impl IntoResponse {
    let scan = state.config.alerts;
    let result: ReportResult<AlertReport> = blocking(move || {
        let workbook = load_workbook(&req.file_path)?;
        Ok(scan_for_alerts_with(&workbook, &scan))
    })
    .await;
    respond(result)
}

/// Months request
#[derive(Deserialize)]
pub struct MonthsRequest {
    #[serde(default)]
    pub run_month: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Months response
#[derive(Serialize, Debug, PartialEq)]
pub struct MonthsResponse {
    pub run_month: String,
    pub psi_month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_month: Option<String>,
}

fn compute_months(req: &MonthsRequest) -> ReportResult<MonthsResponse> {
    let run = match &req.run_month {
        Some(s) => RunMonth::parse(s)?,
        None => RunMonth::current(),
    };
    let approved_month = match &req.tag {
        Some(tag) => derive_approved_month(&run.to_string(), tag)?,
        None => None,
    };
    Ok(MonthsResponse {
        run_month: run.to_string(),
        psi_month: run.minus_months(1)?.to_string(),
        approved_month,
    })
}

/// POST /api/v1/months - PSI and approved months for a run month
pub async fn months(Json(req): Json<MonthsRequest>) -> impl IntoResponse {
    respond(compute_months(&req))
}

/// Plan request
#[derive(Deserialize)]
pub struct PlanRequest {
    pub config_path: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub run_month: Option<String>,
}

/// POST /api/v1/plan - Download requests for the catalog
pub async fn plan(Json(req): Json<PlanRequest>) -> impl IntoResponse {
    let result: ReportResult<Vec<PlannedRequest>> = blocking(move || {
        let catalog = ModelCatalog::load(Path::new(&req.config_path))?;
        let run = match &req.run_month {
            Some(s) => RunMonth::parse(s)?,
            None => RunMonth::current(),
        };
        plan_requests(&catalog, req.model.as_deref(), run)
    })
    .await;
    respond(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiResponse Tests ====================

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());

        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // Verify UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_creates_error_response() {
        let response: ApiResponse<String> = ApiResponse::err("Something went wrong");

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_api_response_request_id_is_unique() {
        let response1: ApiResponse<String> = ApiResponse::ok("test1".to_string());
        let response2: ApiResponse<String> = ApiResponse::ok("test2".to_string());

        assert_ne!(response1.request_id, response2.request_id);
    }

    // ==================== Months Tests ====================

    #[test]
    fn test_compute_months_with_tag() {
        let req = MonthsRequest {
            run_month: Some("202403".to_string()),
            tag: Some("30+DPD @ 75 DOB".to_string()),
        };
        assert_eq!(
            compute_months(&req).unwrap(),
            MonthsResponse {
                run_month: "202403".to_string(),
                psi_month: "202402".to_string(),
                approved_month: Some("202312".to_string()),
            }
        );
    }

    #[test]
    fn test_compute_months_zero_dpd() {
        let req = MonthsRequest {
            run_month: Some("202403".to_string()),
            tag: Some("0+DPD @ 75 DOB".to_string()),
        };
        assert!(matches!(compute_months(&req), Err(ReportError::ZeroDpd(_))));
    }

    #[test]
    fn test_respond_maps_errors_to_bad_request() {
        let (status, Json(body)) =
            respond::<String>(Err(ReportError::InvalidRunMonth("2024".to_string())));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.unwrap().contains("2024"));
    }
}
