//! Red/yellow alert detection in commentary cells
//!
//! Every sheet is scanned for "summary" and "overall comment" labels. The
//! first non-blank, non-zero cell to the right of a label is its value. A
//! value that mentions red or yellow raises an alert. When several sheets
//! carry these labels the last one scanned wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::locator::ScanBounds;
use crate::types::{AlertReport, CellValue};
use crate::workbook::{Workbook, Worksheet};

const ALERT_COLORS: &[&str] = &["red", "yellow"];

/// Where and how far to look for commentary labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertScan {
    pub bounds: ScanBounds,
    /// Columns to the right of a label searched for its value
    pub look_ahead: u32,
}

impl Default for AlertScan {
    fn default() -> Self {
        Self {
            bounds: ScanBounds::new(50, 10),
            look_ahead: 4,
        }
    }
}

fn is_summary_label(label: &str) -> bool {
    // "Performance Summary" headings are not commentary
    label.contains("summary") && !label.contains("performance")
}

fn is_overall_comment_label(label: &str) -> bool {
    label.contains("overall") && label.contains("comment")
}

/// True when the text mentions an alert colour
pub fn mentions_alert_color(text: &str) -> bool {
    let lower = text.to_lowercase();
    ALERT_COLORS.iter().any(|c| lower.contains(c))
}

/// Blank text and numeric zero carry no commentary
fn is_unset(value: &CellValue) -> bool {
    match value {
        CellValue::Int(n) => *n == 0,
        CellValue::Float(f) => *f == 0.0,
        other => other.is_blank(),
    }
}

/// First set value within `look_ahead` columns right of a label
fn value_right_of(sheet: &Worksheet, row: u32, col: u32, look_ahead: u32) -> Option<String> {
    (1..=look_ahead)
        .map(|offset| sheet.get(row, col + offset))
        .find(|v| !is_unset(v))
        .map(|v| v.to_string().trim().to_string())
}

/// Scan with the default window (50 rows × 10 columns, 4-column look-ahead)
pub fn scan_for_alerts(workbook: &Workbook) -> AlertReport {
    scan_for_alerts_with(workbook, &AlertScan::default())
}

pub fn scan_for_alerts_with(workbook: &Workbook, scan: &AlertScan) -> AlertReport {
    let mut report = AlertReport::default();

    for sheet in workbook.sheets() {
        for cell in scan.bounds.cells(sheet) {
            let value = sheet.get_ref(cell);
            if value.is_blank() {
                continue;
            }
            let label = value.label_text();

            if is_summary_label(&label) {
                if let Some(text) = value_right_of(sheet, cell.row, cell.col, scan.look_ahead) {
                    if mentions_alert_color(&text) {
                        debug!(sheet = sheet.name(), cell = %cell, "summary alert");
                        report.has_alerts = true;
                        report
                            .alert_details
                            .push(format!("Summary contains alert: {}", text));
                    }
                    report.summary = Some(text);
                }
            }

            if is_overall_comment_label(&label) {
                if let Some(text) = value_right_of(sheet, cell.row, cell.col, scan.look_ahead) {
                    if mentions_alert_color(&text) {
                        debug!(sheet = sheet.name(), cell = %cell, "overall comments alert");
                        report.has_alerts = true;
                        report
                            .alert_details
                            .push(format!("Overall Comments contains alert: {}", text));
                    }
                    report.overall_comments = Some(text);
                }
            }
        }
    }

    report
}
