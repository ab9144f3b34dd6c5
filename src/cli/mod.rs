//! CLI module for nel-relay
//!
//! Provides command-line interface for:
//! - serve: run the HTTP front door
//! - invoke: run one proxy-integration event and print the response
//! - check-config: validate and print effective configuration

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_handler, check_config, invoke, invoke_event, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_event, write_json};
