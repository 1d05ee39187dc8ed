//! # Token Service
//!
//! Issues and verifies the bearer credentials handed out by `PUT /user/{email}`.
//! Tokens are HS256 JWTs carrying the email claim and a mandatory expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, warn};

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Error types for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Missing bearer credential")]
    Missing,
    #[error("Malformed authorization header")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Failed to encode token: {0}")]
    Encoding(String),
    #[error("Token configuration error: {0}")]
    Configuration(String),
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret
    pub secret: String,
    /// Lifetime of an issued token, in hours
    pub expiry_hours: i64,
}

impl TokenConfig {
    /// Load from environment variables
    ///
    /// - `ACCESS_TOKEN_SECRET`: signing secret, at least 32 characters (required)
    /// - `TOKEN_EXPIRY_HOURS`: token lifetime (defaults to 24)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = env::var("ACCESS_TOKEN_SECRET").map_err(|_| {
            error!("ACCESS_TOKEN_SECRET environment variable not found");
            TokenError::Configuration("ACCESS_TOKEN_SECRET not set".to_string())
        })?;

        let expiry_hours = match env::var("TOKEN_EXPIRY_HOURS") {
            Ok(raw) => raw.parse::<i64>().map_err(|e| {
                TokenError::Configuration(format!("TOKEN_EXPIRY_HOURS: {}", e))
            })?,
            Err(_) => {
                warn!("TOKEN_EXPIRY_HOURS not set, using default: {} hours", DEFAULT_EXPIRY_HOURS);
                DEFAULT_EXPIRY_HOURS
            }
        };

        let config = Self::new(secret, expiry_hours);
        config.validate()?;
        Ok(config)
    }

    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn validate(&self) -> Result<(), TokenError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::Configuration(format!(
                "token secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        if self.expiry_hours <= 0 {
            return Err(TokenError::Configuration(
                "TOKEN_EXPIRY_HOURS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the token was issued to
    pub email: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Signs and verifies bearer tokens
pub struct TokenService {
    expiry: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        Self {
            expiry: Duration::hours(config.expiry_hours),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `email` expiring after the configured lifetime
    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to encode token: {}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => {
                debug!("Token verified for {}", data.claims.email);
                Ok(data.claims)
            }
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid(err.to_string())),
            },
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str, TokenError> {
    let header = header.trim();
    // A blank value or a bare scheme carries no credential
    if header.is_empty() || header == "Bearer" {
        return Err(TokenError::Missing);
    }

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(TokenError::Malformed)
}
