//! # Error Types
//!
//! Typed errors for the two outbound collaborators of the storefront:
//! the record store and the payment processor.
//! Store operations return `StoreResult<T>`, payment operations `PaymentResult<T>`.

use thiserror::Error;

/// Error type for all record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would violate a storage-level unique constraint
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// The backing database rejected or failed the operation
    #[error("Database error: {0}")]
    Database(String),

    /// Could not reach or authenticate against the database
    #[error("Connection error: {0}")]
    Connection(String),

    /// A record could not be converted to or from the storage format
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The operation did not complete within the configured bound
    #[error("Store operation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl StoreError {
    /// Returns true if the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout { .. } | StoreError::Connection(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Duplicate(_) => 409,
            StoreError::Database(_) => 500,
            StoreError::Connection(_) => 503,
            StoreError::Serialization(_) => 500,
            StoreError::Timeout { .. } => 503,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for payment processor calls
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Amount is not a positive, finite number of major units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Currency not supported
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider did not answer within the configured bound
    #[error("Provider call timed out: {0}")]
    Timeout(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_) | PaymentError::Timeout(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidAmount(_) => 400,
            PaymentError::UnsupportedCurrency { .. } => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Timeout(_) => 503,
            PaymentError::Serialization(_) => 502,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
