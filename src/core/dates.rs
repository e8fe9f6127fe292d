//! YYYYMM date tokens, run-month arithmetic and tag expressions
//!
//! Report cells carry calendar months as six-digit `YYYYMM` values, stored
//! either as text or as numbers. They are rewritten into the short `Mon-YY`
//! display form (`202403` → `Mar-24`). Conversion never fails: anything that
//! does not look like a month comes back unchanged.

use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate};
use regex::Regex;

use crate::error::{ReportError, ReportResult};
use crate::types::CellValue;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

const TAG_PATTERN: &str = r"(?i)(\d+)\+DPD\s*@\s*(\d+)\s*DOB";

//==============================================================================
// Date tokens
//==============================================================================

/// Digits a value would present as a date token: the string form with any
/// fractional part dropped. Floats are truncated, never rounded.
fn token_digits(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Text(s) => {
            let s = s.trim();
            Some(s.split('.').next().unwrap_or(s).to_string())
        }
        CellValue::Int(i) => Some(i.to_string()),
        CellValue::Float(f) if f.is_finite() => Some((f.trunc() as i64).to_string()),
        CellValue::Float(_) => None,
    }
}

/// Parse exactly six ASCII digits as `YYYYMM`, enforcing the year and month ranges
fn parse_yyyymm(s: &str) -> Option<NaiveDate> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[4..].parse().ok()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// True iff the value encodes a calendar month as `YYYYMM`
pub fn is_date_token(value: &CellValue) -> bool {
    token_digits(value).is_some_and(|digits| parse_yyyymm(&digits).is_some())
}

/// Format the first day of a month as `Mon-YY`
fn short_month(date: NaiveDate) -> String {
    date.format("%b-%y").to_string()
}

/// Convert a `YYYYMM` value into `Mon-YY`, returning anything else unchanged
pub fn convert_date_token(value: &CellValue) -> CellValue {
    let converted = match value {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if is_date_token(value) {
                parse_yyyymm(trimmed)
            } else {
                None
            }
        }
        CellValue::Int(_) | CellValue::Float(_) => {
            token_digits(value).and_then(|digits| parse_yyyymm(&digits))
        }
        CellValue::Empty => None,
    };

    match converted {
        Some(date) => CellValue::Text(short_month(date)),
        None => value.clone(),
    }
}

//==============================================================================
// Run month
//==============================================================================

/// Calendar month a report is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunMonth(NaiveDate);

impl RunMonth {
    /// Parse a `YYYYMM` string
    pub fn parse(input: &str) -> ReportResult<Self> {
        let trimmed = input.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReportError::InvalidRunMonth(input.to_string()));
        }
        let year: i32 = trimmed[..4]
            .parse()
            .map_err(|_| ReportError::InvalidRunMonth(input.to_string()))?;
        let month: u32 = trimmed[4..]
            .parse()
            .map_err(|_| ReportError::InvalidRunMonth(input.to_string()))?;
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(RunMonth)
            .ok_or_else(|| ReportError::InvalidRunMonth(input.to_string()))
    }

    /// The current month on the local clock
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        RunMonth(today.with_day(1).unwrap_or(today))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Step back `months` calendar months
    pub fn minus_months(&self, months: u32) -> ReportResult<Self> {
        self.0
            .checked_sub_months(Months::new(months))
            .map(RunMonth)
            .ok_or_else(|| {
                ReportError::InvalidRunMonth(format!("{} minus {} months", self, months))
            })
    }

    /// `Mon-YY` display form
    pub fn short_display(&self) -> String {
        short_month(self.0)
    }
}

impl fmt::Display for RunMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.0.year(), self.0.month())
    }
}

//==============================================================================
// Tag expressions
//==============================================================================

/// `"<N>+DPD @ <M> DOB"`: a delinquency threshold (days past due) observed at
/// an offset in days from booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagExpression {
    pub dpd: u32,
    pub dob: u32,
}

impl TagExpression {
    /// Parse the first `N+DPD @ M DOB` occurrence (case-insensitive)
    pub fn parse(tag: &str) -> Option<Self> {
        let re = Regex::new(TAG_PATTERN).ok()?;
        let caps = re.captures(tag)?;
        let dpd = caps.get(1)?.as_str().parse().ok()?;
        let dob = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { dpd, dob })
    }

    /// Months between the approved cohort and the run month: `DOB / DPD + 1`
    pub fn months_back(&self, tag: &str) -> ReportResult<u32> {
        if self.dpd == 0 {
            return Err(ReportError::ZeroDpd(tag.trim().to_string()));
        }
        Ok(self.dob / self.dpd + 1)
    }
}

/// Approved-cohort month for a run month and tag expression.
///
/// `Ok(None)` when the tag does not parse; `ZeroDpd` when its DPD is 0.
pub fn derive_approved_month(run_month: &str, tag: &str) -> ReportResult<Option<String>> {
    let run = RunMonth::parse(run_month)?;
    let Some(expr) = TagExpression::parse(tag) else {
        return Ok(None);
    };
    let back = expr.months_back(tag)?;
    Ok(Some(run.minus_months(back)?.to_string()))
}

/// PSI validation month: one month before the run month
pub fn derive_psi_month(run_month: &str) -> ReportResult<String> {
    Ok(RunMonth::parse(run_month)?.minus_months(1)?.to_string())
}
