//! Normalizer settings and the model catalog
//!
//! Both are read from YAML. Every normalizer setting has a default matching
//! the standard report layout, so the `normalizer:` section may be omitted or
//! only partially given.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::alerts::AlertScan;
use crate::core::locator::ScanBounds;
use crate::error::{ReportError, ReportResult};
use crate::types::CellRef;

/// Default directory for processed reports
pub const DEFAULT_OUTPUT_DIR: &str = "poreports";

const fn column_b(row: u32) -> CellRef {
    CellRef::new(row, 2)
}

//==============================================================================
// Normalizer configuration
//==============================================================================

/// Cells and scan windows used when normalizing a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Window searched for model and segment labels on the first sheet
    pub identity_bounds: ScanBounds,
    pub alerts: AlertScan,
    /// Window searched for the benchmark row and vintage column
    pub benchmark_bounds: ScanBounds,
    /// Cells converted from `YYYYMM` on every sheet
    pub target_cells: Vec<CellRef>,
    /// PSI validation period
    pub psi_cell: CellRef,
    /// Validation performance period, forced equal to `psi_cell`
    pub mirror_cell: CellRef,
    /// Overview cells that may hold the vintage placeholder
    pub vintage_cells: Vec<CellRef>,
    pub vintage_placeholder: String,
    /// Matched case-insensitively
    pub overview_sheet: String,
    /// Matched exactly
    pub accuracy_sheet: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            identity_bounds: ScanBounds::new(10, 10),
            alerts: AlertScan::default(),
            benchmark_bounds: ScanBounds::new(20, 20),
            target_cells: [7, 14, 15, 16, 17].map(column_b).to_vec(),
            psi_cell: column_b(14),
            mirror_cell: column_b(17),
            vintage_cells: vec![column_b(15), column_b(18)],
            vintage_placeholder: "first production month".to_string(),
            overview_sheet: "Overview".to_string(),
            accuracy_sheet: "Accuracy".to_string(),
        }
    }
}

//==============================================================================
// Model catalog
//==============================================================================

/// One segment report of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub segment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Tag expression, e.g. `30+DPD @ 120 DOB`
    #[serde(default)]
    pub tag: String,
    /// Extra request parameters passed through unchanged
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    #[serde(default)]
    pub tag1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub segments: Vec<SegmentConfig>,
}

/// Models and segments whose reports are requested each run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    pub models: Vec<ModelConfig>,
}

impl ModelCatalog {
    pub fn load(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ReportResult<Self> {
        let catalog: ModelCatalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> ReportResult<()> {
        let mut seen = HashSet::new();
        for model in &self.models {
            let name = model.model_name.trim();
            if name.is_empty() {
                return Err(ReportError::Config("model_name must not be empty".to_string()));
            }
            if !seen.insert(name.to_string()) {
                return Err(ReportError::Config(format!("duplicate model '{}'", name)));
            }
            if model.segments.is_empty() {
                return Err(ReportError::Config(format!(
                    "model '{}' has no segments",
                    name
                )));
            }
            if let Some(seg) = model.segments.iter().find(|s| s.segment.trim().is_empty()) {
                return Err(ReportError::Config(format!(
                    "model '{}' has a segment with an empty name (tag '{}')",
                    name, seg.tag
                )));
            }
        }
        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.model_name == name)
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.model_name.as_str()).collect()
    }
}
