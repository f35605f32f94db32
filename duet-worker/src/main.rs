//! Duet Worker - polls the storage root and composes ready jobs

use anyhow::Result;
use duet_core::events::JsonlEventSink;
use duet_core::{ComposerRegistry, Config, Worker};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duet_worker=info,duet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tokio::fs::create_dir_all(&config.storage_root).await?;
    tracing::info!(root = %config.storage_root.display(), "starting composing worker");

    let events = Arc::new(JsonlEventSink::new(&config.storage_root));
    let worker = Worker::new(&config, ComposerRegistry::with_defaults(), events);
    worker.run().await;

    Ok(())
}
