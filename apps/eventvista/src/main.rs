use std::{io, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::AppContext;
use storage::{prepare_database_url, Storage};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

use cli::Cli;
use config::load_settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(database_url) = cli.database_url.clone() {
        settings.database_url = database_url;
    }
    if let Some(latency_ms) = cli.latency_ms {
        settings.latency_ms = latency_ms;
    }

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(%database_url, "failed to open local storage: {error:#}");
        error
    })?;
    storage.health_check().await.map_err(|error| {
        error!(%database_url, "local storage is not answering: {error:#}");
        error
    })?;
    info!(%database_url, latency_ms = settings.latency_ms, "local storage ready");

    let ctx = AppContext::initialize(Arc::new(storage), settings.network()).await?;
    let mut stdout = io::stdout().lock();
    let result = commands::run(&ctx, cli.command, cli.json, &mut stdout).await;
    ctx.shutdown().await;
    result
}
