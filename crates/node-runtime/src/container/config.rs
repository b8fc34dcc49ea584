//! # Node Configuration
//!
//! Runtime parameters for the authentication and heartbeat subsystems,
//! read from `LC_*` environment variables (a `.env` file is honoured).
//!
//! | Variable                       | Default | Meaning                              |
//! |--------------------------------|---------|--------------------------------------|
//! | `LC_JWT_SECRET`                | -       | HMAC secret, at least 32 bytes       |
//! | `LC_JWT_TTL_SECS`              | 86400   | Session credential lifetime          |
//! | `LC_NONCE_TTL_SECS`            | 300     | Login nonce lifetime                 |
//! | `LC_SIGNATURE_MAX_AGE_SECS`    | 300     | Oldest accepted challenge timestamp  |
//! | `LC_CLOCK_SKEW_SECS`           | 60      | Tolerated future skew                |
//! | `LC_NONCE_SWEEP_INTERVAL_SECS` | 30      | In-memory nonce sweep period, max 1 day |
//! | `LC_CHAIN_TIMEOUT_SECS`        | 30      | Chain call deadline, max 1 hour      |
//! | `LC_REDIS_URL`                 | unset   | Redis nonce store; in-memory if unset |
//!
//! ## Security Requirements
//!
//! - `LC_JWT_SECRET` MUST be set; there is no default
//! - `Debug` output never contains the secret or the Redis URL

use lc_01_wallet_auth::AuthSettings;
use std::env;
use std::time::Duration;
use zeroize::Zeroizing;

/// Minimum HMAC secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Upper bound for `LC_CHAIN_TIMEOUT_SECS`.
pub const MAX_CHAIN_TIMEOUT_SECS: u64 = 60 * 60;

/// Upper bound for `LC_NONCE_SWEEP_INTERVAL_SECS`.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Complete node configuration.
#[derive(Clone)]
pub struct NodeConfig {
    /// Wallet authentication configuration.
    pub auth: AuthConfig,
    /// Nonce store configuration.
    pub nonce_store: NonceStoreConfig,
    /// Heartbeat configuration.
    pub heartbeat: HeartbeatConfig,
}

/// Wallet authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for session credentials.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    pub jwt_ttl_secs: i64,
    pub nonce_ttl_secs: u64,
    pub signature_max_age_secs: i64,
    pub clock_skew_secs: i64,
}

impl AuthConfig {
    /// Settings with `secret` and default lifetimes.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        let defaults = AuthSettings::new(Vec::new());
        Self {
            jwt_secret: Zeroizing::new(secret.into()),
            jwt_ttl_secs: defaults.session_ttl_secs,
            nonce_ttl_secs: defaults.nonce_ttl.as_secs(),
            signature_max_age_secs: defaults.signature_max_age_secs,
            clock_skew_secs: defaults.clock_skew_secs,
        }
    }

    pub fn to_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            session_ttl_secs: self.jwt_ttl_secs,
            nonce_ttl: Duration::from_secs(self.nonce_ttl_secs),
            signature_max_age_secs: self.signature_max_age_secs,
            clock_skew_secs: self.clock_skew_secs,
        }
    }
}

/// Nonce store configuration.
#[derive(Clone)]
pub struct NonceStoreConfig {
    /// Redis URL; `None` selects the in-memory store.
    pub redis_url: Option<String>,
    /// Sweep period of the in-memory store.
    pub sweep_interval_secs: u64,
}

impl Default for NonceStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            sweep_interval_secs: 30,
        }
    }
}

/// Heartbeat configuration.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Deadline applied to each commit/reveal chain call.
    pub chain_timeout_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            chain_timeout_secs: 30,
        }
    }
}

impl NodeConfig {
    /// Configuration with `secret` and defaults everywhere else.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            auth: AuthConfig::with_secret(secret),
            nonce_store: NonceStoreConfig::default(),
            heartbeat: HeartbeatConfig::default(),
        }
    }

    /// Load configuration from `.env` (if present) and the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine; variables may be set directly
        let _ = dotenvy::dotenv();
        Self::from_process_env()
    }

    /// Load configuration from the process environment only.
    pub fn from_process_env() -> Result<Self, ConfigError> {
        let secret = env::var("LC_JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("LC_JWT_SECRET".to_string()))?;

        let mut config = Self::with_secret(secret.into_bytes());

        config.auth.jwt_ttl_secs = parse_env_or_default("LC_JWT_TTL_SECS", config.auth.jwt_ttl_secs)?;
        config.auth.nonce_ttl_secs =
            parse_env_or_default("LC_NONCE_TTL_SECS", config.auth.nonce_ttl_secs)?;
        config.auth.signature_max_age_secs = parse_env_or_default(
            "LC_SIGNATURE_MAX_AGE_SECS",
            config.auth.signature_max_age_secs,
        )?;
        config.auth.clock_skew_secs =
            parse_env_or_default("LC_CLOCK_SKEW_SECS", config.auth.clock_skew_secs)?;

        config.nonce_store.sweep_interval_secs = parse_env_or_default(
            "LC_NONCE_SWEEP_INTERVAL_SECS",
            config.nonce_store.sweep_interval_secs,
        )?;
        config.nonce_store.redis_url = env::var("LC_REDIS_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        config.heartbeat.chain_timeout_secs =
            parse_env_or_default("LC_CHAIN_TIMEOUT_SECS", config.heartbeat.chain_timeout_secs)?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "LC_JWT_SECRET".to_string(),
                format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            ));
        }
        positive("LC_JWT_TTL_SECS", self.auth.jwt_ttl_secs)?;
        if self.auth.nonce_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "LC_NONCE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        positive("LC_SIGNATURE_MAX_AGE_SECS", self.auth.signature_max_age_secs)?;
        if self.auth.clock_skew_secs < 0 {
            return Err(ConfigError::InvalidValue(
                "LC_CLOCK_SKEW_SECS".to_string(),
                "must not be negative".to_string(),
            ));
        }
        bounded(
            "LC_NONCE_SWEEP_INTERVAL_SECS",
            self.nonce_store.sweep_interval_secs,
            MAX_SWEEP_INTERVAL_SECS,
        )?;
        bounded(
            "LC_CHAIN_TIMEOUT_SECS",
            self.heartbeat.chain_timeout_secs,
            MAX_CHAIN_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_secs", &self.auth.jwt_ttl_secs)
            .field("nonce_ttl_secs", &self.auth.nonce_ttl_secs)
            .field("signature_max_age_secs", &self.auth.signature_max_age_secs)
            .field("clock_skew_secs", &self.auth.clock_skew_secs)
            .field(
                "redis_url",
                &self.nonce_store.redis_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sweep_interval_secs", &self.nonce_store.sweep_interval_secs)
            .field("chain_timeout_secs", &self.heartbeat.chain_timeout_secs)
            .finish()
    }
}

fn positive(key: &str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn bounded(key: &str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be between 1 and {max}"),
        ));
    }
    Ok(())
}

/// Parse environment variable `key`, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
