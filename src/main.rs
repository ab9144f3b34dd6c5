//! nel-relay CLI entry point
//!
//! Parses arguments, dispatches to a command, prints errors to stderr and
//! exits non-zero on failure. Configuration, logging and the runtime are
//! owned by the CLI module.

use nel_relay::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
