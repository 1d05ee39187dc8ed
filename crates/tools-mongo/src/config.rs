//! # MongoDB Configuration
//!
//! Connection settings for the record store, loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum MongoConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable value: {0}")]
    InvalidEnvVar(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_URI: full connection URI, or else
    /// - DB_USER, DB_PASS, DB_CLUSTER: assembled into a `mongodb+srv` URI
    /// - DB_NAME: database name (defaults to `hexa_tools`)
    /// - MONGO_POOL_SIZE: connection pool size (defaults to 10)
    /// - MONGO_CONNECTION_TIMEOUT: connection timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, MongoConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = match env::var("MONGO_URI") {
            Ok(uri) => {
                debug!("Using MONGO_URI");
                uri
            }
            Err(_) => {
                let user = required("DB_USER")?;
                let pass = required("DB_PASS")?;
                let cluster = required("DB_CLUSTER")?;
                debug!("Assembling MongoDB URI for cluster {}", cluster);
                Self::srv_uri(&user, &pass, &cluster)
            }
        };

        let database = env::var("DB_NAME").unwrap_or_else(|_| {
            debug!("DB_NAME not set, using default: hexa_tools");
            "hexa_tools".to_string()
        });

        let pool_size = env::var("MONGO_POOL_SIZE")
            .unwrap_or_else(|_| {
                warn!("MONGO_POOL_SIZE not set, using default: 10");
                "10".to_string()
            })
            .parse::<u32>()
            .map_err(|e| {
                error!("Invalid MONGO_POOL_SIZE value: {}", e);
                MongoConfigError::InvalidEnvVar(format!("MONGO_POOL_SIZE: {}", e))
            })?;

        let connection_timeout_secs = env::var("MONGO_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| {
                warn!("MONGO_CONNECTION_TIMEOUT not set, using default: 5 seconds");
                "5".to_string()
            })
            .parse::<u64>()
            .map_err(|e| {
                error!("Invalid MONGO_CONNECTION_TIMEOUT value: {}", e);
                MongoConfigError::InvalidEnvVar(format!("MONGO_CONNECTION_TIMEOUT: {}", e))
            })?;

        let config = MongoConfig {
            uri,
            database,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Build an SRV connection URI from credentials and a cluster host
    pub fn srv_uri(user: &str, pass: &str, cluster: &str) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            user, pass, cluster
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MongoConfigError> {
        if self.uri.is_empty() {
            return Err(MongoConfigError::Validation("MongoDB URI cannot be empty".to_string()));
        }

        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return Err(MongoConfigError::Validation(
                "MongoDB URI must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }

        if self.database.is_empty() {
            return Err(MongoConfigError::Validation("MongoDB database cannot be empty".to_string()));
        }

        if self.pool_size == 0 {
            return Err(MongoConfigError::Validation(
                "MongoDB pool size must be greater than 0".to_string(),
            ));
        }

        if self.connection_timeout_secs == 0 {
            return Err(MongoConfigError::Validation(
                "MongoDB connection timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "hexa_tools".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}

fn required(name: &str) -> Result<String, MongoConfigError> {
    env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        MongoConfigError::MissingEnvVar(name.to_string())
    })
}
