//! Report API Server binary
//!
//! HTTP REST API for normalizing report workbooks.

use std::path::PathBuf;

use clap::Parser;
use report_normalizer::api::{run_api_server, ApiConfig};
use report_normalizer::cli::load_config;

#[derive(Parser, Debug)]
#[command(name = "report-server")]
#[command(version)]
#[command(about = "Report API Server - HTTP REST API for report normalization")]
#[command(long_about = r#"
Report API Server - HTTP REST API

Provides RESTful endpoints for the normalizer:
  - POST /api/v1/normalize - Normalize a downloaded report workbook
  - POST /api/v1/alerts    - Scan a report for red/yellow alerts
  - POST /api/v1/months    - PSI and approved months for a run month
  - POST /api/v1/plan      - Download requests for a model catalog

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  report-server                           # Start on localhost:8080
  report-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/months \
    -H "Content-Type: application/json" \
    -d '{"run_month": "202403", "tag": "30+DPD @ 75 DOB"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "REPORT_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "REPORT_PORT")]
    port: u16,

    /// Catalog file whose `normalizer:` section overrides the defaults
    #[arg(short, long, env = "REPORT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        normalizer: load_config(args.config.as_deref())?,
    };

    run_api_server(config).await
}
