//! Report API Server module
//!
//! Provides an HTTP REST API over the normalizer.
//! Run with `report-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
