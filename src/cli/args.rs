//! CLI argument definitions using clap
//!
//! Commands:
//! - restrictor check --preset <name> [--param <json>].. [--message <m>] [--each] [--input <path>]
//! - restrictor presets

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// restrictor - validate JSON values against composable restrictions
#[derive(Parser, Debug)]
#[command(name = "restrictor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON document against a preset restriction
    Check {
        /// Preset name (see `restrictor presets`)
        #[arg(long)]
        preset: String,

        /// Preset parameter as JSON; text that is not JSON is taken as a string
        #[arg(long = "param")]
        params: Vec<String>,

        /// Replace the preset's failure message
        #[arg(long)]
        message: Option<String>,

        /// Treat a top-level array as a list of values to validate one by one
        #[arg(long)]
        each: bool,

        /// Input file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List preset names
    Presets,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
