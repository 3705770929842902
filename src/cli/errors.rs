//! CLI-specific error types
//!
//! Every CLI error ends the process with exit status 2. A value failing its
//! restriction is not an error here; it is a report.

use std::fmt;
use std::io;

use crate::restriction::DefinitionError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/input file)
    IoError,
    /// Input was not valid JSON
    InputError,
    /// Preset could not be built from the given parameters
    DefinitionError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RESTRICTOR_CLI_CONFIG_ERROR",
            Self::IoError => "RESTRICTOR_CLI_IO_ERROR",
            Self::InputError => "RESTRICTOR_CLI_INPUT_ERROR",
            Self::DefinitionError => "RESTRICTOR_CLI_DEFINITION_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed input document
    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::input_error(format!("JSON error: {}", e))
    }
}

impl From<DefinitionError> for CliError {
    fn from(e: DefinitionError) -> Self {
        Self::new(CliErrorCode::DefinitionError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("bad");
        assert_eq!(err.to_string(), "RESTRICTOR_CLI_CONFIG_ERROR: bad");
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn test_definition_error_conversion() {
        let err = CliError::from(DefinitionError::UnknownPreset { name: "x".into() });
        assert_eq!(err.code(), &CliErrorCode::DefinitionError);
        assert!(err.message().contains("unknown preset 'x'"));
    }

    #[test]
    fn test_json_error_is_input_error() {
        let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(CliError::from(e).code_str(), "RESTRICTOR_CLI_INPUT_ERROR");
    }
}
