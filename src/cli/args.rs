//! CLI argument definitions using clap
//!
//! Commands:
//! - storegate serve --config <path> [--port <port>]
//! - storegate check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// storegate - REST front end for keyed stores
#[derive(Parser, Debug)]
#[command(name = "storegate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the configured collections over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./storegate.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file and exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./storegate.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
