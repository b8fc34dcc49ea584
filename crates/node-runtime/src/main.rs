//! # LegacyChain Node
//!
//! Entry point: loads configuration, wires subsystems and waits for Ctrl+C.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use node_runtime::container::NodeConfig;
use node_runtime::NodeRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    // Load configuration
    let config = NodeConfig::from_env().context("invalid configuration")?;
    info!(?config, "Configuration loaded");

    // Create and start the node runtime
    let runtime = NodeRuntime::new(config).await?;
    runtime.start();

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
