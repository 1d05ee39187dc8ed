//! # Payment Bridge Trait
//!
//! The single outbound call the storefront makes to a payment processor:
//! create a payment intent and hand its client secret to the browser.

use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Supported currencies (ISO 4217), all with two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
        }
    }

    /// Convert a major-unit amount (dollars) to minor units (cents)
    pub fn to_minor_units(&self, amount: f64) -> PaymentResult<i64> {
        let minor = (amount * 100.0).round();
        if !minor.is_finite() || minor < 1.0 || minor >= i64::MAX as f64 {
            return Err(PaymentError::InvalidAmount(amount.to_string()));
        }
        Ok(minor as i64)
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "cad" => Ok(Currency::CAD),
            "aud" => Ok(Currency::AUD),
            other => Err(PaymentError::UnsupportedCurrency {
                currency: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A payment intent created by a processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor-side id
    pub intent_id: String,
    /// Secret the client uses to confirm the payment
    pub client_secret: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: Currency,
}

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentBridge: Send + Sync {
    /// Create a payment intent for `amount` major units of `currency`.
    async fn create_intent(&self, amount: f64, currency: Currency) -> PaymentResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment bridge (dynamic dispatch)
pub type SharedPaymentBridge = Arc<dyn PaymentBridge>;
