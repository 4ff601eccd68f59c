//! Signal K client CLI entry point
//!
//! A minimal entrypoint that parses arguments, dispatches to the CLI
//! commands, prints errors to stderr and exits non-zero on failure. All
//! logic is delegated to the CLI module.

use signalk_client::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
