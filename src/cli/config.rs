//! CLI configuration file
//!
//! Optional JSON file given with `--config`. Every field has a default, so an
//! empty object is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Log level (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pretty-print reports (optional, default false)
    #[serde(default)]
    pub pretty: bool,

    /// Validate top-level arrays element by element (optional, default false)
    #[serde(default)]
    pub each: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pretty: false,
            each: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: CliConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.severity().map(|_| ())
    }

    /// Configured level
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }

    /// Level after applying `-v` flags, which override the file
    pub fn effective_severity(&self, verbose: u8) -> CliResult<Severity> {
        match Severity::from_verbosity(verbose) {
            Some(level) => Ok(level),
            None => self.severity(),
        }
    }
}
