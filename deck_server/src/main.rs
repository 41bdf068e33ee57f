//! # Deckwise Server
//!
//! Serves location climate data, material grades, custom loading checks
//! and girder-deck geometry validation as a JSON HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::file_io::load_or_default;
use deck_core::{ReferenceService, ServiceConfig};

mod http_api;

use http_api::AppState;

#[derive(Parser)]
#[command(name = "deckwise-server")]
#[command(about = "HTTP API for girder-deck design inputs", long_about = None)]
#[command(version)]
struct Cli {
    /// Listen address (overrides DECKWISE_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Reference store file (overrides DECKWISE_STORE)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Config file (defaults to ./deckwise.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = ServiceConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }

    let store_path = config.store_path();
    let store = load_or_default(&store_path)
        .with_context(|| format!("failed to load reference store {}", store_path.display()))?;
    log::info!(
        "loaded {} location(s) and {} material grade(s) from {}",
        store.locations.len(),
        store.materials.len(),
        store_path.display()
    );
    if store.locations.is_empty() {
        log::warn!("no location data loaded; run `deckwise ingest-locations` first");
    }

    let state = AppState::new(Arc::new(ReferenceService::new(store)));
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    log::info!("serving Deckwise API on http://{}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
