//! Normalization and alert-detection engine

pub mod alerts;
pub mod dates;
pub mod locator;
pub mod normalizer;

pub use alerts::{scan_for_alerts, scan_for_alerts_with, AlertScan};
pub use dates::{
    convert_date_token, derive_approved_month, derive_psi_month, is_date_token, RunMonth,
    TagExpression,
};
pub use locator::{
    extract_model_and_segment, find_benchmark_vintage, find_labeled_value, ModelSegment,
    ScanBounds,
};
pub use normalizer::{normalize_sheet, normalize_workbook, CellChange, NormalizeOutcome};
