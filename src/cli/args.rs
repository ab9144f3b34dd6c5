//! CLI argument definitions using clap
//!
//! Commands:
//! - nel-relay serve [--config <path>] [--port <port>]
//! - nel-relay invoke --event <path|-> [--config <path>]
//! - nel-relay check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nel-relay - enrich telemetry batches and forward them to a partitioned stream
#[derive(Parser, Debug)]
#[command(name = "nel-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the relay over HTTP
    Serve {
        /// Path to JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overrides configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single proxy-integration event through the relay and print the response
    Invoke {
        /// Event file, or '-' for stdin
        #[arg(long, default_value = "-")]
        event: String,

        /// Path to JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate configuration and print the effective settings
    CheckConfig {
        /// Path to JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
