//! Mini Cache demo host
//!
//! Builds a cache engine from the environment, runs the background sweep and
//! the in-process messaging demo, then waits for a shutdown signal.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::messaging::{self, Receiver};
use mini_cache::{spawn_cleanup_task, Cache, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache engine
/// 4. Start background TTL cleanup task
/// 5. Start the message receiver and send one message
/// 6. Wait for SIGINT/SIGTERM, then stop tasks and report stats
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, cleanup_interval={}s, sweep_batch_size={}, dedup_ttl={}s",
        config.max_entries, config.cleanup_interval, config.sweep_batch_size, config.dedup_ttl
    );

    let cache = Cache::from_config(&config);
    info!("Cache engine initialized");

    let cleanup_handle = spawn_cleanup_task(
        cache.clone(),
        Duration::from_secs(config.cleanup_interval),
        config.sweep_batch_size,
    );
    info!("Background cleanup task started");

    let (sender, inbox) = messaging::channel();
    let receiver = Receiver::new(cache.clone(), config.dedup_ttl);
    let receiver_handle = tokio::spawn(receiver.run(inbox));
    sender
        .send("hello from mini_cache")
        .context("failed to send demo message")?;

    shutdown_signal().await?;

    drop(sender);
    match tokio::time::timeout(Duration::from_secs(1), receiver_handle).await {
        Ok(Ok(processed)) => info!("Receiver finished after {} messages", processed),
        Ok(Err(err)) => warn!("Receiver task failed: {}", err),
        Err(_) => warn!("Receiver did not finish in time"),
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");

    let stats = serde_json::to_string(&cache.stats()).context("failed to encode stats")?;
    info!("Final cache stats: {}", stats);
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?;

        tokio::select! {
            res = signal::ctrl_c() => {
                res.context("failed to install Ctrl+C handler")?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("failed to install Ctrl+C handler")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
