//! Excel exporter implementation - Workbook → Excel (.xlsx)

use crate::error::{ReportError, ReportResult};
use crate::types::{CellRef, CellValue};
use crate::workbook::{Workbook, Worksheet};
use rust_xlsxwriter::{ColNum, Formula, RowNum, Workbook as XlsxWorkbook, Worksheet as XlsxSheet};
use std::path::Path;
use tracing::info;

/// Writes report workbooks to disk
pub struct ExcelExporter<'a> {
    workbook: &'a Workbook,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Export the workbook to an .xlsx file
    pub fn export(&self, output_path: &Path) -> ReportResult<()> {
        let mut xlsx = XlsxWorkbook::new();

        for sheet in self.workbook.sheets() {
            let worksheet = xlsx.add_worksheet();
            worksheet
                .set_name(sheet.name())
                .map_err(|e| ReportError::Write(format!("Failed to set worksheet name: {}", e)))?;
            self.export_sheet(worksheet, sheet)?;
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        xlsx.save(output_path)
            .map_err(|e| ReportError::Write(format!("Failed to save Excel file: {}", e)))?;

        info!(path = %output_path.display(), "workbook saved");
        Ok(())
    }

    /// Write values, then formulas with their cached values as results
    fn export_sheet(&self, worksheet: &mut XlsxSheet, sheet: &Worksheet) -> ReportResult<()> {
        for (cell, value) in sheet.cells() {
            if sheet.formula(cell).is_some() {
                continue;
            }
            let (row, col) = Self::position(cell)?;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s).map_err(|e| {
                        ReportError::Write(format!("Failed to write {}: {}", cell, e))
                    })?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(row, col, *i as f64).map_err(|e| {
                        ReportError::Write(format!("Failed to write {}: {}", cell, e))
                    })?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(row, col, *f).map_err(|e| {
                        ReportError::Write(format!("Failed to write {}: {}", cell, e))
                    })?;
                }
            }
        }

        for (cell, formula) in sheet.formulas() {
            let (row, col) = Self::position(cell)?;
            let result = sheet.get_ref(cell).to_string();
            worksheet
                .write_formula(row, col, Formula::new(formula).set_result(result))
                .map_err(|e| {
                    ReportError::Write(format!("Failed to write formula at {}: {}", cell, e))
                })?;
        }

        Ok(())
    }

    /// 1-based cell coordinate → rust_xlsxwriter's 0-based row/column
    fn position(cell: CellRef) -> ReportResult<(RowNum, ColNum)> {
        let col = ColNum::try_from(cell.col.saturating_sub(1))
            .map_err(|_| ReportError::Write(format!("Column out of range at {}", cell)))?;
        Ok((cell.row.saturating_sub(1), col))
    }
}
