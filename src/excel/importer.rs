//! Excel importer implementation - Excel (.xlsx) → Workbook

use crate::error::{ReportError, ReportResult};
use crate::types::{CellRef, CellValue};
use crate::workbook::{Workbook, Worksheet};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::Path;
use tracing::{info, warn};

/// Reads report workbooks from disk
pub struct ExcelImporter {
    path: std::path::PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import every sheet, in workbook order
    pub fn import(&self) -> ReportResult<Workbook> {
        let mut excel: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            ReportError::Read(format!("{}: {}", self.path.display(), e))
        })?;

        let mut workbook = Workbook::new();
        let sheet_names = excel.sheet_names().to_vec();

        for sheet_name in sheet_names {
            let mut sheet = Worksheet::new(sheet_name.clone());

            match excel.worksheet_range(&sheet_name) {
                Ok(range) => self.load_values(&range, &mut sheet),
                Err(e) => {
                    // keep the sheet so it is written back, just without content
                    warn!(sheet = %sheet_name, error = %e, "could not decode sheet");
                }
            }

            if let Ok(formulas) = excel.worksheet_formula(&sheet_name) {
                self.load_formulas(&formulas, &mut sheet);
            }

            workbook.push_sheet(sheet);
        }

        info!(
            path = %self.path.display(),
            sheets = workbook.sheets().len(),
            "workbook loaded"
        );
        Ok(workbook)
    }

    /// Copy cell values, translating calamine's 0-based offsets into 1-based
    /// absolute coordinates
    fn load_values(&self, range: &Range<Data>, sheet: &mut Worksheet) {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let cell = CellRef::new(start_row + row as u32 + 1, start_col + col as u32 + 1);
            let value = Self::convert_data(data);
            if !value.is_empty() {
                sheet.set_ref(cell, value);
            }
        }
    }

    fn load_formulas(&self, range: &Range<String>, sheet: &mut Worksheet) {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, formula) in range.used_cells() {
            if formula.is_empty() {
                continue;
            }
            let cell = CellRef::new(start_row + row as u32 + 1, start_col + col as u32 + 1);
            // calamine strips the leading '='
            let formula = if formula.starts_with('=') {
                formula.clone()
            } else {
                format!("={}", formula)
            };
            sheet.set_formula(cell, formula);
        }
    }

    /// Map a calamine cell onto the report scalar types
    fn convert_data(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}
