//! # Stripe Payment Intents
//!
//! Implementation of the Stripe PaymentIntents API.
//! The browser confirms the card payment with the returned client secret.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tools_core::{Currency, PaymentBridge, PaymentError, PaymentIntent, PaymentResult};
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents bridge
pub struct StripeIntentBridge {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentBridge {
    /// Create a new Stripe bridge
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    fn transport_error(err: reqwest::Error) -> PaymentError {
        if err.is_timeout() {
            PaymentError::Timeout(err.to_string())
        } else {
            PaymentError::NetworkError(err.to_string())
        }
    }
}

#[async_trait]
impl PaymentBridge for StripeIntentBridge {
    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn create_intent(&self, amount: f64, currency: Currency) -> PaymentResult<PaymentIntent> {
        let minor_units = currency.to_minor_units(amount)?;

        debug!(
            "Creating Stripe payment intent: amount={} {}",
            minor_units, currency
        );

        let form_params: Vec<(&str, String)> = vec![
            ("amount", minor_units.to_string()),
            ("currency", currency.as_str().to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::transport_error)?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: minor_units,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
