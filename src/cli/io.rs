//! JSON I/O handling for CLI
//!
//! - Input: one event document from a file or stdin
//! - Output: one JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};

use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Read an event from `source`, where `-` means stdin
pub fn read_event(source: &str) -> CliResult<String> {
    let content = if source == "-" {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(source)
            .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", source, e)))?
    };

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(content)
}

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
