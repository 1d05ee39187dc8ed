//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the record store handle, the payment bridge, the token service
//! and configuration. Everything is constructed at startup and injected.

use crate::token::{TokenConfig, TokenService};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tools_core::{BoundedStore, MemoryStore, RecordStore, SharedPaymentBridge, SharedStore};
use tools_mongo::{MongoConfig, MongoStore};
use tools_stripe::StripeIntentBridge;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable value: {0}")]
    InvalidEnvVar(String),
    #[error("Invalid socket address {0}")]
    InvalidAddress(String),
}

/// Which record store backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidEnvVar(format!("RECORD_STORE: {}", other))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Record store backend
    pub store_backend: StoreBackend,
    /// Upper bound on every record store call
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar(format!("PORT: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let store_backend = match std::env::var("RECORD_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::default(),
        };

        let store_timeout_secs = match std::env::var("STORE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ConfigError::InvalidEnvVar(format!("STORE_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => DEFAULT_STORE_TIMEOUT_SECS,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            store_backend,
            store_timeout: Duration::from_secs(store_timeout_secs),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            store_backend: StoreBackend::default(),
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Record store, every call bounded by `config.store_timeout`
    pub store: SharedStore,
    /// Payment processor bridge
    pub payments: SharedPaymentBridge,
    /// Bearer token issue/verify
    pub tokens: Arc<TokenService>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from already-constructed collaborators
    pub fn new(
        config: AppConfig,
        store: SharedStore,
        payments: SharedPaymentBridge,
        tokens: TokenService,
    ) -> Self {
        let store: SharedStore = Arc::new(BoundedStore::new(store, config.store_timeout));
        Self {
            store,
            payments,
            tokens: Arc::new(tokens),
            config,
        }
    }

    /// Open every collaborator from the environment
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let token_config = TokenConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to configure tokens: {}", e))?;

        let store: SharedStore = match config.store_backend {
            StoreBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                Arc::new(MongoStore::connect(&mongo_config).await?)
            }
            StoreBackend::Memory => {
                warn!("Using the in-memory record store; data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };
        info!("Record store: {}", store.backend_name());

        let payments = StripeIntentBridge::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::new(
            config,
            store,
            Arc::new(payments),
            TokenService::new(token_config),
        ))
    }
}
