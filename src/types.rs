use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReportError, ReportResult};

//==============================================================================
// Cell values
//==============================================================================

/// Scalar held by a worksheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl CellValue {
    /// True when the cell holds no value at all
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True when the cell is empty or holds only whitespace text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Trimmed, lowercased string form used for label matching
    pub fn label_text(&self) -> String {
        self.to_string().trim().to_lowercase()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

//==============================================================================
// Cell coordinates
//==============================================================================

/// 1-based cell coordinate (row 1, column 1 is "A1")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse A1 notation such as `B14` or `aa10`
    pub fn parse(input: &str) -> ReportResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ReportError::InvalidCellRef("address is empty".to_string()));
        }

        let mut letters = String::new();
        let mut digits = String::new();
        for ch in input.chars() {
            if ch.is_ascii_alphabetic() {
                if !digits.is_empty() {
                    return Err(ReportError::InvalidCellRef(input.to_string()));
                }
                letters.push(ch.to_ascii_uppercase());
            } else if ch.is_ascii_digit() {
                digits.push(ch);
            } else {
                return Err(ReportError::InvalidCellRef(input.to_string()));
            }
        }

        if letters.is_empty() || digits.is_empty() || letters.len() > 3 {
            return Err(ReportError::InvalidCellRef(input.to_string()));
        }

        let col = letters
            .chars()
            .fold(0u32, |acc, c| acc * 26 + (c as u8 - b'A') as u32 + 1);
        let row: u32 = digits
            .parse()
            .map_err(|_| ReportError::InvalidCellRef(input.to_string()))?;

        if row == 0 {
            return Err(ReportError::InvalidCellRef(input.to_string()));
        }

        Ok(Self { row, col })
    }

    /// Column letters for a 1-based column index (1 → A, 27 → AA)
    pub fn column_letters(col: u32) -> String {
        let mut col = col;
        let mut letters = String::new();
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.insert(0, (b'A' + rem as u8) as char);
            col = (col - 1) / 26;
        }
        letters
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", Self::column_letters(self.col), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for CellRef {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CellRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_a1())
    }
}

impl<'de> serde::Deserialize<'de> for CellRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CellRef::parse(&s).map_err(serde::de::Error::custom)
    }
}

//==============================================================================
// Alert report
//==============================================================================

/// Red/yellow markers found in a workbook's commentary cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertReport {
    pub has_alerts: bool,
    pub summary: Option<String>,
    pub overall_comments: Option<String>,
    pub alert_details: Vec<String>,
}
