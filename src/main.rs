use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use tabvault::config::Config;
use tabvault::core::{Engine, Request};
use tabvault::data::JsonFileStore;
use tabvault::host::{Inbound, StdioHost};
use tabvault::util;

/// Save, reopen, and reconcile browser windows by their tab layout.
///
/// The hosting browser connects over stdin/stdout with newline-delimited
/// JSON: lifecycle events and UI requests in, host calls and responses out.
#[derive(Debug, Parser)]
#[command(name = "tabvault", version, about)]
struct Cli {
    /// Data directory (default: ~/.tabvault)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// State file location (default: <data dir>/state.json)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Log filter directive, e.g. "tabvault=debug"
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::paths::init_data_dir(cli.data_dir.clone());

    // Initialize logging to file (~/.tabvault/logs/tabvault.log); stdout
    // belongs to the wire protocol.
    fs::create_dir_all(util::paths::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::paths::log_file_path())?;

    let config = Config::load()?;
    let filter = match cli.log_filter.as_deref().or(config.log_filter.as_deref()) {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::WARN.into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    let state_path = cli
        .state_file
        .or_else(|| config.state_file.clone())
        .unwrap_or_else(util::paths::state_file_path);
    let store = Arc::new(JsonFileStore::new(state_path));

    let (bridge, mut inbound) = StdioHost::spawn(tokio::io::stdin(), tokio::io::stdout());
    let host = Arc::new(bridge.clone());
    let indicators = Arc::new(bridge.clone());

    let mut engine =
        Engine::new(store, host, indicators).with_default_name(config.default_window_name);
    engine.initialize().await?;

    // Single thread of control: each event or request runs to completion,
    // including its flush, before the next is taken off the channel.
    while let Some(message) = inbound.recv().await {
        match message {
            Inbound::Event(event) => {
                if let Err(e) = engine.handle_event(event).await {
                    tracing::error!(error = %e, "Event handler failed");
                }
            }
            Inbound::Request { id, payload } => {
                let response = match serde_json::from_value::<Request>(payload) {
                    Ok(request) => engine.handle_request(request).await,
                    Err(e) => tabvault::core::Response::Error {
                        error: format!("bad request: {e}"),
                    },
                };
                match serde_json::to_value(&response) {
                    Ok(value) => {
                        if let Err(e) = bridge.respond(id, value) {
                            tracing::error!(error = %e, "Failed to send response");
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to encode response"),
                }
            }
        }
    }

    tracing::info!("Host disconnected; shutting down");
    Ok(())
}
