//! Excel import/export for report workbooks
//!
//! - Import: Excel (.xlsx) → `Workbook` (cell values plus formulas)
//! - Export: `Workbook` → Excel (.xlsx)

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;

use std::path::Path;

use crate::error::ReportResult;
use crate::workbook::Workbook;

/// Load an `.xlsx` file into memory
pub fn load_workbook<P: AsRef<Path>>(path: P) -> ReportResult<Workbook> {
    ExcelImporter::new(path).import()
}

/// Save a workbook as `.xlsx`, creating parent directories as needed
pub fn save_workbook<P: AsRef<Path>>(workbook: &Workbook, path: P) -> ReportResult<()> {
    ExcelExporter::new(workbook).export(path.as_ref())
}
