use clap::{Parser, Subcommand};
use report_normalizer::cli;
use report_normalizer::config::DEFAULT_OUTPUT_DIR;
use report_normalizer::error::ReportResult;
use report_normalizer::report::ProcessOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "report-normalizer")]
#[command(about = "Normalize model-monitoring report workbooks and flag red/yellow alerts.")]
#[command(long_about = "Report Normalizer - model-monitoring report workbooks

Rewrites YYYYMM month cells (B7, B14, B15, B16, B17) as Mon-YY, forces the
validation performance period (B17) to equal the PSI validation period (B14),
fills 'First production month' placeholders on the Overview sheet with the
benchmark vintage from the Accuracy sheet, and reports red/yellow markers
found in Summary and Overall Comments cells.

COMMANDS:
  normalize  - Normalize one downloaded report
  alerts     - Scan reports for alerts without modifying them
  months     - Show PSI and approved months for a run month
  plan       - Print download requests for the model catalog
  batch      - Normalize every report in a directory
  watch      - Normalize reports as they arrive in a directory

EXAMPLES:
  report-normalizer normalize doreports/report.xlsx --model Spyder3 --segment 'DE_12M:Overall'
  report-normalizer months --run-month 202403 --tag '30+DPD @ 75 DOB'
  report-normalizer plan --config models.yaml --model NTPP2
  report-normalizer batch doreports --out-dir poreports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one downloaded report
    Normalize {
        /// Path to the downloaded .xlsx report
        input: PathBuf,

        /// Output path (default: <out-dir>/<model>_<segment>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for processed reports
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        out_dir: PathBuf,

        /// Model name used for the output file name (requires --segment)
        #[arg(long, requires = "segment")]
        model: Option<String>,

        /// Segment used for the output file name (requires --model)
        #[arg(long, requires = "model")]
        segment: Option<String>,

        /// Catalog file whose `normalizer:` section overrides the defaults
        #[arg(short, long, env = "REPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Show every rewritten cell
        #[arg(short, long)]
        verbose: bool,
    },

    /// Scan reports for red/yellow alerts without modifying them
    Alerts {
        /// Reports to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Catalog file whose `normalizer:` section overrides the defaults
        #[arg(short, long, env = "REPORT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show the PSI month and, for a tag, the approved month
    Months {
        /// Run month as YYYYMM (default: current month)
        #[arg(short, long)]
        run_month: Option<String>,

        /// Tag expression, e.g. "30+DPD @ 75 DOB"
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Print the download requests for every catalog segment as JSON
    Plan {
        /// Model catalog (YAML)
        #[arg(short, long, env = "REPORT_CONFIG")]
        config: PathBuf,

        /// Only this model (default: all models)
        #[arg(short, long)]
        model: Option<String>,

        /// Run month as YYYYMM (default: current month)
        #[arg(short, long)]
        run_month: Option<String>,
    },

    /// Normalize every .xlsx report in a directory
    Batch {
        /// Directory of downloaded reports
        dir: PathBuf,

        /// Directory for processed reports
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        out_dir: PathBuf,

        #[arg(short, long, env = "REPORT_CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Watch a directory and normalize reports as they arrive
    Watch {
        /// Directory receiving downloaded reports
        dir: PathBuf,

        /// Directory for processed reports
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        out_dir: PathBuf,

        #[arg(short, long, env = "REPORT_CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    run(Cli::parse())?;
    Ok(())
}

fn run(cli: Cli) -> ReportResult<()> {
    match cli.command {
        Commands::Normalize {
            input,
            output,
            out_dir,
            model,
            segment,
            config,
            verbose,
        } => {
            let options = ProcessOptions {
                output,
                output_dir: out_dir,
                model_name: model,
                segment,
                config: cli::load_config(config.as_deref())?,
            };
            cli::normalize(input, options, verbose)
        }

        Commands::Alerts { files, config } => {
            cli::alerts(files, &cli::load_config(config.as_deref())?)
        }

        Commands::Months { run_month, tag } => cli::months(run_month, tag),

        Commands::Plan {
            config,
            model,
            run_month,
        } => cli::plan(config, model, run_month),

        Commands::Batch {
            dir,
            out_dir,
            config,
            verbose,
        } => {
            let options = ProcessOptions {
                output_dir: out_dir,
                config: cli::load_config(config.as_deref())?,
                ..Default::default()
            };
            cli::batch(dir, options, verbose)
        }

        Commands::Watch {
            dir,
            out_dir,
            config,
            verbose,
        } => {
            let options = ProcessOptions {
                output_dir: out_dir,
                config: cli::load_config(config.as_deref())?,
                ..Default::default()
            };
            cli::watch(dir, options, verbose)
        }
    }
}
