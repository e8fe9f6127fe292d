//! CLI command handlers

pub mod commands;

pub use commands::{alerts, batch, load_config, months, normalize, plan, watch};
