//! Download parameters for report requests
//!
//! Each catalog segment becomes one request for the reporting API. The run
//! month determines the PSI month and, through the segment's tag expression,
//! the approved-cohort month.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{ModelCatalog, ModelConfig, SegmentConfig};
use crate::core::dates::{derive_approved_month, derive_psi_month, RunMonth};
use crate::error::{ReportError, ReportResult};

const DEFAULT_MOB: &str = "3";

/// Query parameters of one report download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub model_name: String,
    pub segment: String,
    pub tag1: String,
    pub mob1: String,
    pub approved_month1: String,
    pub psi_month: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

const RESERVED: &[&str] = &[
    "receiver",
    "model_name",
    "segment",
    "tag1",
    "mob1",
    "approved_month1",
    "psi_month",
    "tag",
    "segment_prefix",
];

/// Build the request for one segment of a model.
///
/// The segment tag must be a `N+DPD @ M DOB` expression; an empty or
/// unparseable tag is a validation error for that segment.
pub fn build_request(
    model: &ModelConfig,
    segment: &SegmentConfig,
    run_month: RunMonth,
) -> ReportResult<ReportRequest> {
    let run = run_month.to_string();
    let approved_month1 = derive_approved_month(&run, &segment.tag)?.ok_or_else(|| {
        ReportError::Validation(format!(
            "tag '{}' of segment '{}' is not of the form N+DPD @ M DOB",
            segment.tag.trim(),
            segment.segment
        ))
    })?;
    let psi_month = derive_psi_month(&run)?;

    let mut extra = BTreeMap::new();
    if let Some(product) = &segment.product {
        extra.insert("product".to_string(), product.clone());
    }
    for (key, value) in &segment.extra {
        if !RESERVED.contains(&key.as_str()) {
            extra.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    Ok(ReportRequest {
        receiver: model.receiver.clone(),
        model_name: model.model_name.clone(),
        segment: segment.segment.clone(),
        tag1: model.tag1.clone(),
        mob1: DEFAULT_MOB.to_string(),
        approved_month1,
        psi_month,
        extra,
    })
}

/// One segment's request, or the reason it could not be built
#[derive(Debug, Serialize)]
pub struct PlannedRequest {
    pub model_name: String,
    pub segment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ReportRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Requests for every segment of the selected model, or of all models.
///
/// A segment whose request cannot be built (a zero-DPD, empty or unparseable
/// tag) is reported in place without stopping the others.
pub fn plan_requests(
    catalog: &ModelCatalog,
    model: Option<&str>,
    run_month: RunMonth,
) -> ReportResult<Vec<PlannedRequest>> {
    let models: Vec<&ModelConfig> = match model {
        Some(name) => vec![catalog.model(name).ok_or_else(|| {
            ReportError::Validation(format!(
                "Model '{}' not found. Available models: {}",
                name,
                catalog.model_names().join(", ")
            ))
        })?],
        None => catalog.models.iter().collect(),
    };

    let mut planned = Vec::new();
    for model in models {
        for segment in &model.segments {
            let (request, error) = match build_request(model, segment, run_month) {
                Ok(request) => (Some(request), None),
                Err(e) => (None, Some(e.to_string())),
            };
            planned.push(PlannedRequest {
                model_name: model.model_name.clone(),
                segment: segment.segment.clone(),
                request,
                error,
            });
        }
    }
    Ok(planned)
}
