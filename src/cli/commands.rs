use crate::config::{ModelCatalog, NormalizerConfig};
use crate::core::alerts::scan_for_alerts_with;
use crate::core::dates::{derive_approved_month, RunMonth, TagExpression};
use crate::error::{ReportError, ReportResult};
use crate::excel::load_workbook;
use crate::report::{is_workbook_file, list_workbooks, process_report, ProcessOptions, ProcessedReport};
use crate::request::plan_requests;
use crate::types::AlertReport;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Normalizer settings from the `normalizer:` section of a catalog file, or
/// the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> ReportResult<NormalizerConfig> {
    match path {
        Some(path) => Ok(ModelCatalog::load(path)?.normalizer),
        None => Ok(NormalizerConfig::default()),
    }
}

fn parse_run_month(run_month: Option<&str>) -> ReportResult<RunMonth> {
    match run_month {
        Some(s) => RunMonth::parse(s),
        None => Ok(RunMonth::current()),
    }
}

fn print_alerts(alerts: &AlertReport) {
    if alerts.has_alerts {
        println!("   {}", "⚠️  Alert found!".bold().red());
        println!(
            "   Summary:  {}",
            alerts.summary.as_deref().unwrap_or("-").yellow()
        );
        println!(
            "   Comments: {}",
            alerts.overall_comments.as_deref().unwrap_or("-").yellow()
        );
        for detail in &alerts.alert_details {
            println!("     - {}", detail);
        }
    } else {
        println!("   {}", "✅ No alerts".green());
    }
}

fn print_processed(report: &ProcessedReport, verbose: bool) {
    println!("   Output: {}", report.output.display().to_string().bright_blue());
    if verbose {
        let identity = &report.outcome.identity;
        println!(
            "   Model: {}  Segment: {}",
            identity.model_name.as_deref().unwrap_or("-"),
            identity.segment.as_deref().unwrap_or("-")
        );
        if let Some(vintage) = &report.outcome.vintage {
            println!("   Benchmark vintage: {}", vintage);
        }
        for change in &report.outcome.changes {
            println!(
                "   {}!{}: {} → {}",
                change.sheet, change.cell, change.before, change.after
            );
        }
    }
    print_alerts(&report.outcome.alerts);
}

/// Execute the normalize command
pub fn normalize(input: PathBuf, options: ProcessOptions, verbose: bool) -> ReportResult<()> {
    println!("{}", "📊 Report Normalizer".bold().green());
    println!("   Input: {}", input.display());
    println!();

    if !input.exists() {
        return Err(ReportError::Validation(format!(
            "File not found: {}",
            input.display()
        )));
    }

    let report = process_report(&input, &options)?;
    print_processed(&report, verbose);
    println!();
    println!(
        "{} {} cells rewritten",
        "✅ Normalized:".bold().green(),
        report.outcome.changes.len()
    );
    Ok(())
}

/// Execute the alerts command: scan only, nothing is written
pub fn alerts(files: Vec<PathBuf>, config: &NormalizerConfig) -> ReportResult<()> {
    let mut flagged = 0;
    for file in &files {
        println!("{} {}", "📋".cyan(), file.display().to_string().bold());
        let workbook = load_workbook(file)?;
        let report = scan_for_alerts_with(&workbook, &config.alerts);
        if report.has_alerts {
            flagged += 1;
        }
        print_alerts(&report);
        println!();
    }

    if files.len() > 1 {
        println!("{} of {} reports have alerts", flagged, files.len());
    }
    Ok(())
}

/// Execute the months command: PSI and approved months for a run month
pub fn months(run_month: Option<String>, tag: Option<String>) -> ReportResult<()> {
    let run = parse_run_month(run_month.as_deref())?;
    let psi = run.minus_months(1)?;

    println!("Run month:     {} ({})", run, run.short_display());
    println!("PSI month:     {} ({})", psi, psi.short_display());

    if let Some(tag) = tag {
        match derive_approved_month(&run.to_string(), &tag)? {
            Some(approved) => {
                let back = TagExpression::parse(&tag)
                    .and_then(|t| t.months_back(&tag).ok())
                    .unwrap_or_default();
                println!("Approved month: {} ({} months back, tag '{}')", approved, back, tag.trim());
            }
            None => {
                println!(
                    "{} tag '{}' is not of the form N+DPD @ M DOB",
                    "⚠️  Approved month unavailable:".yellow(),
                    tag.trim()
                );
            }
        }
    }
    Ok(())
}

/// Execute the plan command: print one JSON request per catalog segment
pub fn plan(config: PathBuf, model: Option<String>, run_month: Option<String>) -> ReportResult<()> {
    let catalog = ModelCatalog::load(&config)?;
    let run = parse_run_month(run_month.as_deref())?;
    let planned = plan_requests(&catalog, model.as_deref(), run)?;

    for entry in &planned {
        if let Some(error) = &entry.error {
            eprintln!(
                "{} {} - {}: {}",
                "❌".red(),
                entry.model_name,
                entry.segment,
                error
            );
        }
    }
    println!("{}", serde_json::to_string_pretty(&planned)?);
    Ok(())
}

/// Execute the batch command: normalize every workbook in a directory
pub fn batch(dir: PathBuf, options: ProcessOptions, verbose: bool) -> ReportResult<()> {
    println!("{}", "📊 Report Normalizer - Batch".bold().green());
    println!("   Directory: {}", dir.display());
    println!("   Output:    {}\n", options.output_dir.display());

    let files = list_workbooks(&dir)?;
    if files.is_empty() {
        println!("{}", "No .xlsx files found".yellow());
        return Ok(());
    }

    let mut processed = Vec::new();
    let mut failed = 0;
    for file in &files {
        println!("{} {}", "🔄".cyan(), file.display());
        match process_report(file, &options) {
            Ok(report) => {
                print_processed(&report, verbose);
                processed.push(report);
            }
            Err(e) => {
                failed += 1;
                println!("   {} {}", "❌ Error processing report:".bold().red(), e);
            }
        }
        println!();
    }

    let alerted: Vec<&ProcessedReport> = processed
        .iter()
        .filter(|r| r.outcome.alerts.has_alerts)
        .collect();

    println!(
        "{} {} processed, {} failed",
        "✅ Batch complete:".bold().green(),
        processed.len(),
        failed
    );
    if alerted.is_empty() {
        println!("{}", "✅ No alerts found in any reports".green());
    } else {
        println!("{}", format!("⚠️  Found {} alerts!", alerted.len()).bold().red());
        for report in alerted {
            println!("   {}", report.output.display().to_string().bold());
            for detail in &report.outcome.alerts.alert_details {
                println!("     - {}", detail);
            }
        }
    }
    Ok(())
}

/// Execute the watch command: normalize workbooks as they land in `dir`
pub fn watch(dir: PathBuf, options: ProcessOptions, verbose: bool) -> ReportResult<()> {
    println!("{}", "👁️  Report Normalizer - Watch Mode".bold().green());
    println!("   Watching: {}", dir.display());
    println!("   Output:   {}", options.output_dir.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !dir.is_dir() {
        return Err(ReportError::Validation(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let watched = dir.canonicalize()?;
    std::fs::create_dir_all(&options.output_dir)?;
    if options.output_dir.canonicalize()? == watched {
        return Err(ReportError::Validation(
            "Output directory must differ from the watched directory".to_string(),
        ));
    }

    let (tx, rx) = channel();

    // Debounce so a download is processed once it has finished writing
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)
        .map_err(|e| ReportError::Validation(format!("Failed to create file watcher: {}", e)))?;

    debouncer
        .watcher()
        .watch(&watched, RecursiveMode::NonRecursive)
        .map_err(|e| ReportError::Validation(format!("Failed to watch directory: {}", e)))?;

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let paths: HashSet<PathBuf> = events
                    .into_iter()
                    .filter(|event| event.kind == DebouncedEventKind::Any)
                    .map(|event| event.path)
                    .filter(|path| is_workbook_file(path))
                    .collect();

                for path in paths {
                    println!(
                        "{} {} {}",
                        "🔄 New report at".cyan(),
                        chrono::Local::now().format("%H:%M:%S").to_string().cyan(),
                        path.display()
                    );
                    match process_report(&path, &options) {
                        Ok(report) => print_processed(&report, verbose),
                        Err(e) => println!("   {} {}", "❌ Processing failed:".bold().red(), e),
                    }
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}
