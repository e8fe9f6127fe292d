//! Heuristic cell location
//!
//! Report workbooks do not keep their labels at fixed coordinates, so values
//! are found by scanning a bounded top-left region for label text and then
//! reading the value either inline (`Label: value`) or from the cell to the
//! right of the label.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::dates::convert_date_token;
use crate::naming::sanitize_component;
use crate::types::{CellRef, CellValue};
use crate::workbook::{Workbook, Worksheet};

/// Keywords that mark the model-name label
pub const MODEL_KEYWORDS: &[&str] = &["model", "vehicle", "car"];

/// Keywords that mark the segment label
pub const SEGMENT_KEYWORDS: &[&str] = &["segment", "category", "class"];

/// Inclusive scan window: rows `1..=rows`, columns `1..=cols`, clipped to the
/// sheet's populated extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBounds {
    pub rows: u32,
    pub cols: u32,
}

impl ScanBounds {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Coordinates inside the window for `sheet`, in row-major order
    pub fn cells(&self, sheet: &Worksheet) -> impl Iterator<Item = CellRef> {
        let max_row = self.rows.min(sheet.max_row());
        let max_col = self.cols.min(sheet.max_column());
        (1..=max_row).flat_map(move |row| (1..=max_col).map(move |col| CellRef::new(row, col)))
    }
}

/// Model name and segment as found on the first sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelSegment {
    pub model_name: Option<String>,
    pub segment: Option<String>,
}

/// Find the first labelled value whose label contains any of `keywords`.
///
/// A label containing a colon yields the text after its last colon; otherwise
/// the value is the next cell to the right. The result is sanitized for use
/// as a filename component. Labels whose value is empty are skipped and the
/// scan carries on.
pub fn find_labeled_value(
    sheet: &Worksheet,
    keywords: &[&str],
    bounds: ScanBounds,
) -> Option<String> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    for cell in bounds.cells(sheet) {
        let value = sheet.get_ref(cell);
        if value.is_blank() {
            continue;
        }

        let text = value.to_string();
        let label = text.trim();
        let lower = label.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }

        let raw = match label.rfind(':') {
            Some(idx) => label[idx + 1..].trim().to_string(),
            None => sheet.get(cell.row, cell.col + 1).to_string().trim().to_string(),
        };

        let cleaned = sanitize_component(&raw);
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    None
}

/// Model name and segment from the first sheet of a workbook
pub fn extract_model_and_segment(workbook: &Workbook, bounds: ScanBounds) -> ModelSegment {
    let Some(sheet) = workbook.first_sheet() else {
        return ModelSegment::default();
    };

    ModelSegment {
        model_name: find_labeled_value(sheet, MODEL_KEYWORDS, bounds),
        segment: find_labeled_value(sheet, SEGMENT_KEYWORDS, bounds),
    }
}

/// Coordinate of the benchmark vintage: the row of the first cell reading
/// exactly "benchmark" crossed with the column of the first cell mentioning
/// "vintage". `None` if either label is missing.
pub fn locate_benchmark_vintage(sheet: &Worksheet, bounds: ScanBounds) -> Option<CellRef> {
    let mut benchmark_row = None;
    let mut vintage_col = None;

    for cell in bounds.cells(sheet) {
        let value = sheet.get_ref(cell);
        if value.is_blank() {
            continue;
        }
        let label = value.label_text();
        if benchmark_row.is_none() && label == "benchmark" {
            benchmark_row = Some(cell.row);
        }
        if vintage_col.is_none() && label.contains("vintage") {
            vintage_col = Some(cell.col);
        }
    }

    Some(CellRef::new(benchmark_row?, vintage_col?))
}

/// Benchmark vintage value, converted to `Mon-YY` when it is a date token.
///
/// A missing benchmark row or vintage column is logged; an empty vintage
/// cell yields `None` silently.
pub fn find_benchmark_vintage(sheet: &Worksheet, bounds: ScanBounds) -> Option<CellValue> {
    let Some(cell) = locate_benchmark_vintage(sheet, bounds) else {
        warn!(
            sheet = sheet.name(),
            "could not find Benchmark row or Vintage column"
        );
        return None;
    };
    let value = sheet.get_ref(cell);
    if value.is_empty() {
        return None;
    }
    Some(convert_date_token(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: ScanBounds = ScanBounds::new(10, 10);

    #[test]
    fn test_inline_label() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(3, 1, "Model: Sedan-X");
        assert_eq!(
            find_labeled_value(&sheet, &["model"], BOUNDS),
            Some("Sedan-X".to_string())
        );
    }

    #[test]
    fn test_adjacent_label() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(3, 1, "Model");
        sheet.set(3, 2, "Sedan-X");
        assert_eq!(
            find_labeled_value(&sheet, &["model"], BOUNDS),
            Some("Sedan-X".to_string())
        );
    }

    #[test]
    fn test_last_colon_wins() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(1, 1, "Segment: DE_12M:Overall");
        assert_eq!(
            find_labeled_value(&sheet, SEGMENT_KEYWORDS, BOUNDS),
            Some("Overall".to_string())
        );
    }

    #[test]
    fn test_value_is_sanitized() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(2, 1, "Model Name");
        sheet.set(2, 2, "  Spyder 3 (EU)  ");
        assert_eq!(
            find_labeled_value(&sheet, MODEL_KEYWORDS, BOUNDS),
            Some("Spyder_3_EU".to_string())
        );
    }

    #[test]
    fn test_first_match_row_major() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(2, 3, "Model: second");
        sheet.set(2, 1, "Model: first");
        sheet.set(1, 5, "Vehicle: earliest");
        assert_eq!(
            find_labeled_value(&sheet, MODEL_KEYWORDS, BOUNDS),
            Some("earliest".to_string())
        );
    }

    #[test]
    fn test_empty_value_keeps_scanning() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(1, 1, "Model");
        sheet.set(4, 1, "Model:");
        sheet.set(5, 1, "Model: NTPP2");
        assert_eq!(
            find_labeled_value(&sheet, MODEL_KEYWORDS, BOUNDS),
            Some("NTPP2".to_string())
        );
    }

    #[test]
    fn test_bounds_limit_scan() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(11, 1, "Model: hidden");
        assert_eq!(find_labeled_value(&sheet, MODEL_KEYWORDS, BOUNDS), None);
        assert_eq!(
            find_labeled_value(&sheet, MODEL_KEYWORDS, ScanBounds::new(11, 1)),
            Some("hidden".to_string())
        );
    }

    #[test]
    fn test_value_cell_may_sit_outside_bounds() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(1, 2, "Segment");
        sheet.set(1, 3, "FR");
        assert_eq!(
            find_labeled_value(&sheet, SEGMENT_KEYWORDS, ScanBounds::new(10, 2)),
            Some("FR".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        let mut sheet = Worksheet::new("Overview");
        sheet.set(1, 1, "Run date");
        assert_eq!(find_labeled_value(&sheet, MODEL_KEYWORDS, BOUNDS), None);
        assert_eq!(
            find_labeled_value(&Worksheet::new("empty"), MODEL_KEYWORDS, BOUNDS),
            None
        );
    }

    #[test]
    fn test_extract_model_and_segment_uses_first_sheet() {
        let mut wb = Workbook::new();
        let first = wb.add_sheet("Overview");
        first.set(1, 1, "Model: Spyder3");
        first.set(2, 1, "Segment");
        first.set(2, 2, "DE 12M");
        wb.add_sheet("Other").set(1, 1, "Model: ignored");

        let found = extract_model_and_segment(&wb, BOUNDS);
        assert_eq!(found.model_name.as_deref(), Some("Spyder3"));
        assert_eq!(found.segment.as_deref(), Some("DE_12M"));
    }

    #[test]
    fn test_extract_from_empty_workbook() {
        assert_eq!(
            extract_model_and_segment(&Workbook::new(), BOUNDS),
            ModelSegment::default()
        );
    }

    fn accuracy_sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Accuracy");
        sheet.set(2, 1, "Population");
        sheet.set(2, 3, "Vintage");
        sheet.set(3, 1, "Development");
        sheet.set(3, 3, 202201.0);
        sheet.set(4, 1, " Benchmark ");
        sheet.set(4, 3, 202306.0);
        sheet
    }

    #[test]
    fn test_find_benchmark_vintage() {
        let sheet = accuracy_sheet();
        assert_eq!(
            locate_benchmark_vintage(&sheet, ScanBounds::new(20, 20)),
            Some(CellRef::new(4, 3))
        );
        assert_eq!(
            find_benchmark_vintage(&sheet, ScanBounds::new(20, 20)),
            Some(CellValue::from("Jun-23"))
        );
    }

    #[test]
    fn test_benchmark_must_match_exactly() {
        let mut sheet = Worksheet::new("Accuracy");
        sheet.set(1, 2, "Vintage");
        sheet.set(3, 1, "Benchmark model");
        sheet.set(3, 2, 202306i64);
        assert_eq!(find_benchmark_vintage(&sheet, ScanBounds::new(20, 20)), None);
    }

    #[test]
    fn test_missing_vintage_column() {
        let mut sheet = Worksheet::new("Accuracy");
        sheet.set(3, 1, "Benchmark");
        sheet.set(3, 2, 202306i64);
        assert_eq!(locate_benchmark_vintage(&sheet, ScanBounds::new(20, 20)), None);
    }

    #[test]
    fn test_non_date_vintage_passes_through() {
        let mut sheet = Worksheet::new("Accuracy");
        sheet.set(1, 2, "Vintage");
        sheet.set(2, 1, "benchmark");
        sheet.set(2, 2, "Q3 2023");
        assert_eq!(
            find_benchmark_vintage(&sheet, ScanBounds::new(20, 20)),
            Some(CellValue::from("Q3 2023"))
        );
    }
}
