//! # Subsystem Container
//!
//! Holds the wired subsystem services and the adapters behind their ports.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Nonce store (Redis or in-memory), identity repository
//! Level 1: Wallet authentication (lc-01)
//! Level 2: Heartbeat (lc-02) with chain gateway and vault directory
//! ```
//!
//! All services are held behind `Arc` so request handlers can share them.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use lc_01_wallet_auth::{
    InMemoryIdentityRepository, InMemoryNonceStore, NonceStore, RedisNonceStore,
    WalletAuthService,
};
use lc_02_heartbeat::{
    CallContext, ChainGateway, HeartbeatService, InMemoryCommitmentRepository,
    InMemoryVaultDirectory, RecordingChainGateway, VaultDirectory,
};
use shared_types::{SystemTimeSource, TimeSource};

use crate::container::config::NodeConfig;

/// Which nonce store backs the authentication service.
#[derive(Clone)]
pub enum NonceBackend {
    /// Shared Redis instance; expiry is handled by Redis.
    Redis,
    /// Process-local map; needs the background sweeper.
    Memory(Arc<InMemoryNonceStore>),
}

impl std::fmt::Debug for NonceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis => f.write_str("Redis"),
            Self::Memory(store) => write!(f, "Memory({} entries)", store.len()),
        }
    }
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Node configuration.
    pub config: NodeConfig,

    // =========================================================================
    // LEVEL 0: Storage
    // =========================================================================
    /// Nonce store selection.
    pub nonce_backend: NonceBackend,
    /// Commitment persistence.
    pub commitments: Arc<InMemoryCommitmentRepository>,

    // =========================================================================
    // LEVEL 1: Wallet Authentication
    // =========================================================================
    pub auth: Arc<WalletAuthService>,

    // =========================================================================
    // LEVEL 2: Heartbeat
    // =========================================================================
    pub heartbeat: Arc<HeartbeatService>,
}

impl SubsystemContainer {
    /// Wire all subsystems.
    ///
    /// No chain client ships with this crate, so a recording gateway and an
    /// empty vault directory stand in for them. Use [`Self::with_ports`] to
    /// inject real ones.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        warn!("No chain client configured; heartbeat transactions are recorded locally only");
        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        Self::with_ports(
            config,
            Arc::new(RecordingChainGateway::with_clock(clock.clone())),
            Arc::new(InMemoryVaultDirectory::new()),
            clock,
        )
        .await
    }

    /// Wire all subsystems around the given chain ports and clock.
    pub async fn with_ports(
        config: NodeConfig,
        chain: Arc<dyn ChainGateway>,
        vaults: Arc<dyn VaultDirectory>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        info!("Initializing subsystems");

        // Level 0
        let (nonce_backend, nonce_store): (NonceBackend, Arc<dyn NonceStore>) =
            match config.nonce_store.redis_url.as_deref() {
                Some(url) => {
                    let store = RedisNonceStore::connect(url)
                        .await
                        .context("failed to connect to Redis nonce store")?;
                    info!("  [Level 0] Nonce store: Redis");
                    let store: Arc<dyn NonceStore> = Arc::new(store);
                    (NonceBackend::Redis, store)
                }
                None => {
                    let memory = Arc::new(InMemoryNonceStore::with_clock(clock.clone()));
                    info!("  [Level 0] Nonce store: in-memory");
                    let store: Arc<dyn NonceStore> = memory.clone();
                    (NonceBackend::Memory(memory), store)
                }
            };
        let identities = Arc::new(InMemoryIdentityRepository::new());
        let commitments = Arc::new(InMemoryCommitmentRepository::new());

        // Level 1
        let auth = Arc::new(WalletAuthService::with_clock(
            nonce_store,
            identities,
            &config.auth.to_settings(),
            clock.clone(),
        ));
        info!("  [Level 1] Wallet authentication ready");

        // Level 2
        let heartbeat = Arc::new(HeartbeatService::with_clock(
            chain,
            vaults,
            commitments.clone(),
            clock,
        ));
        info!("  [Level 2] Heartbeat ready");

        Ok(Self {
            config,
            nonce_backend,
            commitments,
            auth,
            heartbeat,
        })
    }

    /// Context for one heartbeat call, bounded by the configured chain timeout.
    pub fn heartbeat_context(&self) -> CallContext {
        CallContext::with_timeout(Duration::from_secs(
            self.config.heartbeat.chain_timeout_secs,
        ))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.config.nonce_store.sweep_interval_secs)
    }
}
