//! CLI command implementations
//!
//! Each command opens one client, runs to completion and exits; `watch`
//! runs until interrupted.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::{timeout, Duration};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::client::SignalkClient;
use crate::stream::consumer::{DeliveryShape, DeliveryTarget, UpdateFilter};

/// Bound applied to connection readiness; the client itself enforces none.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// CLI entry point: install logging, parse arguments, dispatch.
pub async fn run() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run_command(Cli::parse_args()).await
}

/// Dispatch one parsed command.
pub async fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Endpoints => endpoints(&cli.host, cli.port).await,
        Command::Get { path, raw } => get(&cli.host, cli.port, &path, raw).await,
        Command::Watch { path, enveloped } => watch(&cli.host, cli.port, &path, enveloped).await,
        Command::Put { path, value } => put(&cli.host, cli.port, &path, &value).await,
    }
}

async fn endpoints(host: &str, port: u16) -> CliResult<()> {
    let client = SignalkClient::open(host, port)?;
    for path in client.endpoints().await? {
        println!("{}", path);
    }
    Ok(())
}

async fn get(host: &str, port: u16, path: &str, raw: bool) -> CliResult<()> {
    let client = SignalkClient::open(host, port)?;
    let filter: Option<UpdateFilter> = raw.then(|| Arc::new(|doc: Value| doc) as UpdateFilter);

    match client.get_value(path, filter.as_ref()).await? {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(CliError::NoValue(path.to_string())),
    }
}

async fn watch(host: &str, port: u16, path: &str, enveloped: bool) -> CliResult<()> {
    let client = SignalkClient::open(host, port)?;
    wait_for(&client).await?;

    let shape = if enveloped {
        DeliveryShape::Enveloped
    } else {
        DeliveryShape::Bare
    };
    client.register(
        path,
        DeliveryTarget::from_fn(|value| println!("{}", value)),
        None,
        shape,
    )?;

    tokio::signal::ctrl_c().await.ok();
    Ok(())
}

async fn put(host: &str, port: u16, path: &str, raw_value: &str) -> CliResult<()> {
    // Anything that fails to parse as JSON is sent as a string literal.
    let value: Value =
        serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.to_string()));

    let client = SignalkClient::open(host, port)?;
    wait_for(&client).await?;

    let request_id = client.put_value(path, value)?;
    println!("{}", request_id);
    Ok(())
}

async fn wait_for(client: &SignalkClient) -> CliResult<()> {
    timeout(CONNECT_TIMEOUT, client.wait_until_open())
        .await
        .map_err(|_| CliError::ConnectTimeout)
}
