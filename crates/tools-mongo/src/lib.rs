//! # tools-mongo
//!
//! MongoDB record store for the Hexa Tools storefront.
//!
//! One MongoDB collection per record collection (`users`, `products`,
//! `orders`, `reviews`) in a single database. The users collection carries
//! a unique index on `email`.
//!
//! ```rust,ignore
//! use tools_mongo::{MongoConfig, MongoStore};
//!
//! let store = MongoStore::connect(&MongoConfig::from_env()?).await?;
//! // ... serve requests ...
//! store.close().await?;
//! ```

pub mod config;
pub mod store;

pub use config::{MongoConfig, MongoConfigError};
pub use store::MongoStore;
