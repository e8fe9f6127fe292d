//! In-memory workbook model
//!
//! A `Workbook` is an ordered list of named `Worksheet`s. Cells are stored
//! sparsely and addressed with 1-based `(row, col)` pairs or `CellRef`s.
//! Reading a coordinate that was never written yields `CellValue::Empty`.

use std::collections::BTreeMap;

use crate::types::{CellRef, CellValue};

/// A 2-D grid of cells with an optional formula per cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<CellRef, CellValue>,
    formulas: BTreeMap<CellRef, String>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Value at a 1-based coordinate, `Empty` if unset
    pub fn get(&self, row: u32, col: u32) -> &CellValue {
        self.get_ref(CellRef::new(row, col))
    }

    pub fn get_ref(&self, cell: CellRef) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&cell).unwrap_or(&EMPTY)
    }

    /// True when the coordinate holds a non-empty value
    pub fn has_cell(&self, cell: CellRef) -> bool {
        self.cells.get(&cell).is_some_and(|v| !v.is_empty())
    }

    /// Overwrite a cell. Any formula previously at that coordinate is dropped.
    pub fn set(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.set_ref(CellRef::new(row, col), value);
    }

    pub fn set_ref(&mut self, cell: CellRef, value: impl Into<CellValue>) {
        let value = value.into();
        self.formulas.remove(&cell);
        if value.is_empty() {
            self.cells.remove(&cell);
        } else {
            self.cells.insert(cell, value);
        }
    }

    /// Attach a formula to a cell, keeping its cached value
    pub fn set_formula(&mut self, cell: CellRef, formula: impl Into<String>) {
        self.formulas.insert(cell, formula.into());
    }

    pub fn formula(&self, cell: CellRef) -> Option<&str> {
        self.formulas.get(&cell).map(String::as_str)
    }

    /// Largest populated row (0 for an empty sheet)
    pub fn max_row(&self) -> u32 {
        self.cells
            .keys()
            .chain(self.formulas.keys())
            .map(|c| c.row)
            .max()
            .unwrap_or(0)
    }

    /// Largest populated column (0 for an empty sheet)
    pub fn max_column(&self) -> u32 {
        self.cells
            .keys()
            .chain(self.formulas.keys())
            .map(|c| c.col)
            .max()
            .unwrap_or(0)
    }

    /// Populated cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &CellValue)> {
        self.cells.iter().map(|(r, v)| (*r, v))
    }

    pub fn formulas(&self) -> impl Iterator<Item = (CellRef, &str)> {
        self.formulas.iter().map(|(r, f)| (*r, f.as_str()))
    }
}

/// Ordered collection of named worksheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet and return a mutable handle to it
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut Worksheet {
        self.sheets.push(Worksheet::new(name));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn push_sheet(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    /// Sheet by exact name
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn first_sheet(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Worksheet] {
        &mut self.sheets
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
