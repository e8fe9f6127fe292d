//! Output file naming
//!
//! Processed reports are saved as `<model>_<segment>.xlsx`. The parts come
//! from caller overrides when both are given, otherwise from the labels found
//! in the workbook, otherwise from the input file's base name.

use std::path::Path;

use crate::core::locator::ModelSegment;

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace()
}

/// Filename-safe form of an extracted label value: everything but word
/// characters, whitespace and hyphens is dropped, whitespace runs become `_`
pub fn sanitize_component(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| is_kept(*c)).collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Filename-safe form of a caller-supplied model or segment (`DE_12M:Overall`
/// → `DE_12M_Overall`)
pub fn sanitize_override(raw: &str) -> String {
    raw.trim()
        .replace(':', "_")
        .chars()
        .filter(|c| is_kept(*c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// File name for a processed report
pub fn output_file_name(
    model_override: Option<&str>,
    segment_override: Option<&str>,
    found: &ModelSegment,
    input: &Path,
) -> String {
    let overrides = model_override
        .map(sanitize_override)
        .filter(|m| !m.is_empty())
        .zip(segment_override.map(sanitize_override).filter(|s| !s.is_empty()));
    if let Some((model, segment)) = overrides {
        return format!("{}_{}.xlsx", model, segment);
    }

    match (&found.model_name, &found.segment) {
        (Some(model), Some(segment)) => format!("{}_{}.xlsx", model, segment),
        (Some(model), None) => format!("{}_unknown_segment.xlsx", model),
        _ => {
            let base = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report".to_string());
            format!("{}_formatted.xlsx", base)
        }
    }
}
