//! Date normalization and cross-field propagation
//!
//! For each sheet:
//! 1. the PSI validation period (B14) is converted from `YYYYMM` to `Mon-YY`;
//! 2. the remaining target cells are converted, except the validation
//!    performance period (B17), which is overwritten with B14's value;
//! 3. on the Overview sheet, vintage placeholders (B15, B18) are replaced by
//!    the benchmark vintage read from the Accuracy sheet.
//!
//! Cells holding formulas are left alone. Missing cells are skipped.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NormalizerConfig;
use crate::core::alerts::scan_for_alerts_with;
use crate::core::dates::convert_date_token;
use crate::core::locator::{extract_model_and_segment, find_benchmark_vintage, ModelSegment};
use crate::types::{AlertReport, CellRef, CellValue};
use crate::workbook::{Workbook, Worksheet};

/// One rewritten cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellChange {
    pub sheet: String,
    pub cell: CellRef,
    pub before: CellValue,
    pub after: CellValue,
}

/// Everything learned and changed while normalizing one workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeOutcome {
    #[serde(flatten)]
    pub identity: ModelSegment,
    pub alerts: AlertReport,
    pub vintage: Option<CellValue>,
    pub changes: Vec<CellChange>,
}

/// Value and formula of a cell, read together so both can be mirrored
struct Slot {
    value: CellValue,
    formula: Option<String>,
}

fn write_if_changed(
    sheet: &mut Worksheet,
    cell: CellRef,
    value: CellValue,
    changes: &mut Vec<CellChange>,
) {
    let before = sheet.get_ref(cell).clone();
    if before == value && sheet.formula(cell).is_none() {
        return;
    }
    debug!(sheet = sheet.name(), cell = %cell, before = %before, after = %value, "cell rewritten");
    sheet.set_ref(cell, value.clone());
    changes.push(CellChange {
        sheet: sheet.name().to_string(),
        cell,
        before,
        after: value,
    });
}

/// Convert the PSI cell in place and return what the mirror cell must hold
fn normalize_psi(
    sheet: &mut Worksheet,
    config: &NormalizerConfig,
    changes: &mut Vec<CellChange>,
) -> Option<Slot> {
    let cell = config.psi_cell;
    if let Some(formula) = sheet.formula(cell) {
        return Some(Slot {
            value: sheet.get_ref(cell).clone(),
            formula: Some(formula.to_string()),
        });
    }

    let current = sheet.get_ref(cell);
    if current.is_empty() {
        return None;
    }
    let converted = convert_date_token(current);
    write_if_changed(sheet, cell, converted.clone(), changes);
    Some(Slot {
        value: converted,
        formula: None,
    })
}

/// Force the mirror cell to hold exactly what the PSI cell holds
fn mirror_psi(
    sheet: &mut Worksheet,
    cell: CellRef,
    psi: &Slot,
    changes: &mut Vec<CellChange>,
) {
    match &psi.formula {
        Some(formula) => {
            if sheet.formula(cell) == Some(formula.as_str()) && *sheet.get_ref(cell) == psi.value {
                return;
            }
            let before = sheet.get_ref(cell).clone();
            sheet.set_ref(cell, psi.value.clone());
            sheet.set_formula(cell, formula.clone());
            changes.push(CellChange {
                sheet: sheet.name().to_string(),
                cell,
                before,
                after: psi.value.clone(),
            });
        }
        None => write_if_changed(sheet, cell, psi.value.clone(), changes),
    }
}

/// Apply the propagation rule to one sheet, returning the cells it rewrote
pub fn normalize_sheet(sheet: &mut Worksheet, config: &NormalizerConfig) -> Vec<CellChange> {
    let mut changes = Vec::new();
    let psi = normalize_psi(sheet, config, &mut changes);

    for &cell in &config.target_cells {
        if cell == config.psi_cell {
            continue;
        }
        if cell == config.mirror_cell {
            if let Some(psi) = &psi {
                mirror_psi(sheet, cell, psi, &mut changes);
                continue;
            }
        }
        if sheet.formula(cell).is_some() {
            continue;
        }
        let current = sheet.get_ref(cell);
        if current.is_empty() {
            continue;
        }
        let converted = convert_date_token(current);
        if converted != *current {
            write_if_changed(sheet, cell, converted, &mut changes);
        }
    }

    changes
}

/// Replace vintage placeholders on the overview sheet
pub fn copy_vintage(
    sheet: &mut Worksheet,
    vintage: &CellValue,
    config: &NormalizerConfig,
) -> Vec<CellChange> {
    let placeholder = config.vintage_placeholder.trim().to_lowercase();
    let mut changes = Vec::new();

    for &cell in &config.vintage_cells {
        let current = sheet.get_ref(cell);
        if current.is_blank() || current.label_text() != placeholder {
            continue;
        }
        write_if_changed(sheet, cell, vintage.clone(), &mut changes);
    }

    changes
}

/// Benchmark vintage from the accuracy sheet, if that sheet exists
pub fn benchmark_vintage(workbook: &Workbook, config: &NormalizerConfig) -> Option<CellValue> {
    let sheet = workbook.sheet(&config.accuracy_sheet)?;
    find_benchmark_vintage(sheet, config.benchmark_bounds)
}

/// Normalize a workbook in place.
///
/// Model/segment extraction and the alert scan see the workbook as loaded;
/// date conversion and propagation run afterwards, sheet by sheet.
pub fn normalize_workbook(workbook: &mut Workbook, config: &NormalizerConfig) -> NormalizeOutcome {
    if workbook.is_empty() {
        warn!("workbook has no sheets");
        return NormalizeOutcome::default();
    }

    let identity = extract_model_and_segment(workbook, config.identity_bounds);
    let alerts = scan_for_alerts_with(workbook, &config.alerts);
    let vintage = benchmark_vintage(workbook, config);

    let mut changes = Vec::new();
    for sheet in workbook.sheets_mut() {
        changes.extend(normalize_sheet(sheet, config));
        if let Some(vintage) = &vintage {
            if sheet.is_named(&config.overview_sheet) {
                changes.extend(copy_vintage(sheet, vintage, config));
            }
        }
    }

    NormalizeOutcome {
        identity,
        alerts,
        vintage,
        changes,
    }
}
