//! Load → normalize → save for a single downloaded report

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{NormalizerConfig, DEFAULT_OUTPUT_DIR};
use crate::core::normalizer::{normalize_workbook, NormalizeOutcome};
use crate::error::ReportResult;
use crate::excel::{load_workbook, save_workbook};
use crate::naming::output_file_name;

/// How a report is processed and where it is written
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Explicit output path; when unset the file is named from the report
    pub output: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Caller-supplied model name, used for naming together with `segment`
    pub model_name: Option<String>,
    pub segment: Option<String>,
    pub config: NormalizerConfig,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            output: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model_name: None,
            segment: None,
            config: NormalizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub outcome: NormalizeOutcome,
}

/// Normalize the workbook at `input` and save it
pub fn process_report(input: &Path, options: &ProcessOptions) -> ReportResult<ProcessedReport> {
    let mut workbook = load_workbook(input)?;
    let outcome = normalize_workbook(&mut workbook, &options.config);

    let output = match &options.output {
        Some(path) => path.clone(),
        None => options.output_dir.join(output_file_name(
            options.model_name.as_deref(),
            options.segment.as_deref(),
            &outcome.identity,
            input,
        )),
    };

    save_workbook(&workbook, &output)?;

    Ok(ProcessedReport {
        input: input.to_path_buf(),
        output,
        outcome,
    })
}

/// `.xlsx` files directly inside `dir`, sorted by name. Excel lock files
/// (`~$name.xlsx`) are skipped.
pub fn list_workbooks(dir: &Path) -> ReportResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_workbook_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn is_workbook_file(path: &Path) -> bool {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    let is_lock = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    is_xlsx && !is_lock && path.is_file()
}
