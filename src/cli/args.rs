//! CLI argument definitions using clap
//!
//! Commands:
//! - signalk-client --host <host> --port <port> endpoints
//! - signalk-client --host <host> --port <port> get <path>
//! - signalk-client --host <host> --port <port> watch <path>
//! - signalk-client --host <host> --port <port> put <path> <value>

use clap::{Parser, Subcommand};

/// Signal K client - streaming delta subscriptions and REST tree access
#[derive(Parser, Debug)]
#[command(name = "signalk-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Signal K server hostname
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Signal K server port
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every leaf path of the server data tree
    Endpoints,

    /// Fetch the current value of a path and exit
    Get {
        /// Dotted data-tree path, e.g. navigation.position
        path: String,

        /// Print the whole document instead of the unwrapped value
        #[arg(long)]
        raw: bool,
    },

    /// Subscribe to a path and print updates until interrupted
    Watch {
        /// Dotted data-tree path
        path: String,

        /// Print the full {source, timestamp, value} envelope
        #[arg(long)]
        enveloped: bool,
    },

    /// Request that a path be set to a JSON value
    Put {
        /// Dotted data-tree path
        path: String,

        /// New value; parsed as JSON, or sent as a string when not valid JSON
        value: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
