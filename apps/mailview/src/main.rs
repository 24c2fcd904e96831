use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpMailStore, ViewController};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod session;
mod terminal;

use terminal::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "mailview", version, about = "Terminal views over a webmail /emails API")]
struct Args {
    /// Settings file; defaults to ./mailview.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Show the sent mailbox even when sending failed.
    #[arg(long)]
    navigate_on_failed_send: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.request_timeout_ms = timeout_ms;
    }
    if args.navigate_on_failed_send {
        settings.navigate_on_failed_send = true;
    }

    let store = HttpMailStore::new(settings.server_url()?)?;
    info!(
        server_url = %store.base_url(),
        timeout_ms = settings.request_timeout_ms,
        "mailview started"
    );

    let renderer = Arc::new(TerminalRenderer::new(std::io::stdout()));
    let controller = Arc::new(ViewController::new(
        Arc::new(store),
        renderer.clone(),
        settings.controller_settings(),
    ));

    // A failed first load is already on screen; keep accepting commands.
    if let Err(err) = controller.start().await {
        debug!(error = %err, "initial inbox load did not complete");
    }
    session::run(controller, &*renderer, BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
