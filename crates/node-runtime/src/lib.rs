//! # LegacyChain Node Runtime
//!
//! Wires the wallet authentication and heartbeat subsystems into one
//! process and owns their background tasks.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment (`.env` honoured)
//! 2. Connect the nonce store and wire subsystems
//! 3. Spawn the in-memory nonce sweeper when Redis is not configured
//! 4. Run until Ctrl+C, then signal shutdown

pub mod container;

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use lc_01_wallet_auth::spawn_sweeper;

use crate::container::{NodeConfig, NonceBackend, SubsystemContainer};

/// The node runtime owning all subsystems.
pub struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<SubsystemContainer>,
    /// Background tasks started by [`NodeRuntime::start`].
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Create a runtime with the default (local) chain ports.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        let container = SubsystemContainer::new(config).await?;
        Ok(Self::from_container(container))
    }

    /// Create a runtime around an already wired container.
    pub fn from_container(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start background tasks.
    pub fn start(&self) {
        info!("===========================================");
        info!("  LegacyChain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        if let NonceBackend::Memory(store) = &self.container.nonce_backend {
            let interval = self.container.sweep_interval();
            info!(interval_secs = interval.as_secs(), "Starting nonce sweeper");
            let handle = spawn_sweeper(store.clone(), interval, self.shutdown_rx.clone());
            self.tasks.lock().push(handle);
        }

        info!("Node started");
    }

    /// Signal shutdown and wait for background tasks to exit.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Background task failed: {}", e);
            }
        }

        info!("Shutdown complete");
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    pub fn running_tasks(&self) -> usize {
        self.tasks.lock().len()
    }
}
