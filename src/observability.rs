//! Logging bootstrap
//!
//! The library only emits `tracing` events (debug and trace level). Binaries
//! install a subscriber once through `init_logging`; output goes to stderr so
//! that stdout carries nothing but JSON reports.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Log severity levels, least severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Returns the filter directive for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// Level selected by repeated `-v` flags; `None` when no flag was given
    pub fn from_verbosity(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Severity::Info),
            2 => Some(Severity::Debug),
            _ => Some(Severity::Trace),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "Invalid log level: '{}'. Expected one of trace, debug, info, warn, error.",
                other
            )),
        }
    }
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is harmless; the
/// first subscriber stays.
pub fn init_logging(level: Severity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(level = %level, "logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("TRACE".parse::<Severity>().unwrap(), Severity::Trace);
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(Severity::from_verbosity(0), None);
        assert_eq!(Severity::from_verbosity(1), Some(Severity::Info));
        assert_eq!(Severity::from_verbosity(2), Some(Severity::Debug));
        assert_eq!(Severity::from_verbosity(9), Some(Severity::Trace));
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Trace < Severity::Error);
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Severity::Warn);
        init_logging(Severity::Trace);
    }
}
