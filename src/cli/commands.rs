//! CLI command implementations

use serde::Serialize;
use serde_json::Value;

use crate::observability;
use crate::presets;
use crate::restriction::{Restriction, RestrictionError};

use super::args::{Cli, Command};
use super::config::CliConfig;
use super::errors::CliResult;
use super::io::{read_input, write_stdout};

/// How a successful command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed; any validated input was accepted
    Valid,
    /// The input failed its restriction
    Invalid,
}

/// Result of checking one input document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RestrictionError>,
}

impl Report {
    pub fn outcome(&self) -> Outcome {
        if self.valid {
            Outcome::Valid
        } else {
            Outcome::Invalid
        }
    }
}

/// Parsed `check` arguments
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub preset: String,
    pub params: Vec<Value>,
    pub message: Option<String>,
    pub each: bool,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<Outcome> {
    run_cli(Cli::parse_args())
}

/// Load configuration, start logging and run the command
pub fn run_cli(cli: Cli) -> CliResult<Outcome> {
    let config = CliConfig::load_or_default(cli.config.as_deref())?;
    observability::init_logging(config.effective_severity(cli.verbose)?);
    run_command(cli.command, &config)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, config: &CliConfig) -> CliResult<Outcome> {
    match cmd {
        Command::Check {
            preset,
            params,
            message,
            each,
            input,
        } => {
            let request = CheckRequest {
                preset,
                params: params.iter().map(|p| parse_param(p)).collect(),
                message,
                each: each || config.each,
            };
            let document = read_input(input.as_deref())?;
            let report = check(&request, &document)?;
            write_stdout(&report, config.pretty)?;
            Ok(report.outcome())
        }
        Command::Presets => {
            write_stdout(&presets::NAMES, config.pretty)?;
            Ok(Outcome::Valid)
        }
    }
}

/// Build the requested restriction and validate `document` with it
pub fn check(request: &CheckRequest, document: &Value) -> CliResult<Report> {
    let restriction = build(request)?;

    let result = match document {
        Value::Array(items) if request.each => {
            restriction.validate_all(items.iter().collect()).map(|_| ())
        }
        _ => restriction.check(document),
    };

    let report = match result {
        Ok(()) => Report {
            valid: true,
            error: None,
        },
        Err(e) => Report {
            valid: false,
            error: Some(e),
        },
    };
    tracing::info!(preset = %request.preset, valid = report.valid, "check complete");
    Ok(report)
}

fn build(request: &CheckRequest) -> CliResult<Restriction> {
    let restriction = presets::lookup(&request.preset, &request.params)?;
    if let Some(message) = &request.message {
        restriction.set_message(message.as_str());
    }
    Ok(restriction)
}

/// A `--param` value: JSON when it parses, otherwise the raw text as a string
pub fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;

    fn request(preset: &str, params: Vec<Value>) -> CheckRequest {
        CheckRequest {
            preset: preset.to_string(),
            params,
            ..CheckRequest::default()
        }
    }

    #[test]
    fn test_check_valid() {
        let report = check(&request("string", vec![]), &json!("foo")).unwrap();
        assert_eq!(report.outcome(), Outcome::Valid);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_check_invalid_reports_error() {
        let report = check(&request("gt", vec![json!(42)]), &json!(41)).unwrap();
        assert_eq!(report.outcome(), Outcome::Invalid);

        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["valid"], false);
        assert_eq!(out["error"]["message"], "Must be a 'number' greater than 42");
        assert_eq!(out["error"]["code"], "ERR_RESTRICTION");
    }

    #[test]
    fn test_check_each() {
        let mut req = request("integer", vec![]);
        assert!(!check(&req, &json!([1, 2, 3])).unwrap().valid);

        req.each = true;
        assert!(check(&req, &json!([1, 2, 3])).unwrap().valid);

        let report = check(&req, &json!([1, 2.5])).unwrap();
        assert_eq!(report.error.unwrap().value(), &json!(2.5));
    }

    #[test]
    fn test_message_override() {
        let mut req = request("string", vec![]);
        req.message = Some("name must be text".into());
        let report = check(&req, &json!(1)).unwrap();
        assert_eq!(report.error.unwrap().message(), "name must be text");
    }

    #[test]
    fn test_unknown_preset() {
        let err = check(&request("nope", vec![]), &json!(1)).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DefinitionError);
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("42"), json!(42));
        assert_eq!(parse_param("\"x\""), json!("x"));
        assert_eq!(parse_param("^f"), json!("^f"));
    }
}
