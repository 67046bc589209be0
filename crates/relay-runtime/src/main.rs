//! # Relaycore Node Runtime
//!
//! The entry point for the relaycore hub process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (env-filterable via `RELAY_LOG`)
//! 2. Load configuration from environment
//! 3. Construct the event hub
//! 4. Start the gateway (EmitEvent + ListenEvent endpoints)
//! 5. Serve until Ctrl+C, then shut down gracefully

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_bus::EventHub;
use relay_gateway::GatewayService;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::NodeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("RELAY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load configuration
    let config = NodeConfig::from_env();

    info!("===========================================");
    info!("  Relaycore Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        endpoint = %config.gateway.addr(),
        capacity = config.hub.channel_capacity,
        overflow = ?config.hub.overflow,
        "configuration loaded"
    );

    // Construct the hub and gateway
    let hub = Arc::new(EventHub::with_config(config.hub));
    let gateway = GatewayService::new(config.gateway, Arc::clone(&hub))
        .context("failed to construct gateway")?;

    // Shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let server = tokio::spawn(gateway.run(shutdown_rx));

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    // Graceful shutdown: stop accepting connections, then end open sessions.
    info!("Initiating graceful shutdown...");
    if shutdown_tx.send(true).is_err() {
        error!("gateway already stopped");
    }
    hub.shutdown();

    match server.await {
        Ok(Ok(())) => info!("Shutdown complete"),
        Ok(Err(err)) => error!(error = %err, "gateway exited with error"),
        Err(err) => error!(error = %err, "gateway task panicked"),
    }

    Ok(())
}
