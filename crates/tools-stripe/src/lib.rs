//! # tools-stripe
//!
//! Stripe payment bridge for the Hexa Tools storefront.
//!
//! **StripeIntentBridge** creates PaymentIntents through the Stripe REST API
//! and returns the client secret the browser needs to confirm a card payment.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tools_stripe::StripeIntentBridge;
//! use tools_core::{Currency, PaymentBridge};
//!
//! let bridge = StripeIntentBridge::from_env()?;
//! let intent = bridge.create_intent(49.99, Currency::USD).await?;
//!
//! // Send intent.client_secret to the browser
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripeIntentBridge;
