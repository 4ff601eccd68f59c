//! CLI module for the Signal K client
//!
//! Provides a command-line interface for:
//! - endpoints: list every leaf path of the server data tree
//! - get: one-shot value read
//! - watch: subscribe to a path and print updates
//! - put: request a path be set to a value

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliResult};
