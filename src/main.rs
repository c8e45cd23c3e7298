use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recyclose::api::AppState;
use recyclose::config::{LoggingConfig, RecycloseConfig};
use recyclose::saved::{self, FjallStore, SavedStore};
use recyclose::web;

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(env_filter)
            .init();
    }
    Ok(())
}

fn open_saved_store(config: &RecycloseConfig) -> anyhow::Result<SavedStore> {
    match config.storage.location.as_deref() {
        Some(path) => {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create storage directory {path}"))?;
            let backend = FjallStore::open(path)
                .with_context(|| format!("Failed to open saved items at {path}"))?;
            Ok(SavedStore::new(backend))
        }
        None => Ok(SavedStore::in_memory()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RecycloseConfig::load()?;
    init_tracing(&config.logging)?;

    saved::init(open_saved_store(&config)?)?;
    let saved = saved::store().context("Saved store not initialized")?;

    let state = AppState::new(config, saved)?;
    info!(
        "Serving {} drop-off points, map {}",
        state.directory.len(),
        if state.geocoder.is_some() { "enabled" } else { "unavailable" }
    );

    web::run(state).await?;
    Ok(())
}
