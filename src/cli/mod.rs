//! CLI module for restrictor
//!
//! Provides command-line interface for:
//! - check: Validate a JSON document against a preset
//! - presets: List preset names

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, parse_param, run, run_cli, run_command, CheckRequest, Outcome, Report};
pub use config::CliConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_document, read_input, write_report};
