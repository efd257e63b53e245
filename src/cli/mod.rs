//! CLI module for storegate
//!
//! Provides command-line interface for:
//! - serve: Serve configured collections over HTTP
//! - check: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_server, check, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
