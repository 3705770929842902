//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one JSON report on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Parse a JSON document from text
pub fn parse_document(text: &str) -> CliResult<Value> {
    if text.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }
    Ok(serde_json::from_str(text)?)
}

/// Read the input document from `path`, or stdin when `None`
pub fn read_input(path: Option<&Path>) -> CliResult<Value> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            text
        }
    };
    parse_document(&text)
}

/// Write `report` to `writer` as one JSON document followed by a newline
pub fn write_report<T, W>(writer: &mut W, report: &T, pretty: bool) -> CliResult<()>
where
    T: Serialize,
    W: Write,
{
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, report)?;
    } else {
        serde_json::to_writer(&mut *writer, report)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `report` to stdout
pub fn write_stdout<T: Serialize>(report: &T, pretty: bool) -> CliResult<()> {
    write_report(&mut io::stdout().lock(), report, pretty)
}
