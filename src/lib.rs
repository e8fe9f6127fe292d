//! Report Normalizer - model-monitoring report workbooks
//!
//! Reports downloaded from the monitoring API arrive as `.xlsx` workbooks whose
//! labels move around between variants. This library finds the meaningful cells
//! by scanning for label text, rewrites `YYYYMM` month cells as `Mon-YY`,
//! keeps the validation periods consistent, fills vintage placeholders and
//! flags red/yellow commentary.
//!
//! # Example
//!
//! ```no_run
//! use report_normalizer::config::NormalizerConfig;
//! use report_normalizer::core::normalize_workbook;
//! use report_normalizer::excel::{load_workbook, save_workbook};
//!
//! let mut workbook = load_workbook("doreports/report.xlsx")?;
//! let outcome = normalize_workbook(&mut workbook, &NormalizerConfig::default());
//!
//! if outcome.alerts.has_alerts {
//!     println!("{:?}", outcome.alerts.alert_details);
//! }
//! save_workbook(&workbook, "poreports/report.xlsx")?;
//! # Ok::<(), report_normalizer::error::ReportError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod naming;
pub mod report;
pub mod request;
pub mod types;
pub mod workbook;

// Re-export commonly used types
pub use error::{ReportError, ReportResult};
pub use types::{AlertReport, CellRef, CellValue};
pub use workbook::{Workbook, Worksheet};
