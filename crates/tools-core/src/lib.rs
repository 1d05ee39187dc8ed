//! # tools-core
//!
//! Core types and traits for the Hexa Tools storefront backend.
//!
//! This crate provides:
//! - `RecordStore` trait for data-access backends, with `MemoryStore`
//!   and the timeout-bounded `BoundedStore` decorator
//! - `Collection`, `RecordKey`, `Filter` and write acknowledgements
//! - `Role` for the two-value user role
//! - `PaymentBridge` trait and `Currency` for payment intents
//! - `StoreError` and `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use tools_core::{Collection, Filter, ListOrder, MemoryStore, RecordStore};
//!
//! let store = MemoryStore::new();
//! let ack = store.insert(Collection::Reviews, review).await?;
//! let newest = store
//!     .find_many(Collection::Reviews, &Filter::all(), ListOrder::NewestFirst)
//!     .await?;
//! ```

pub mod error;
pub mod memory;
pub mod payment;
pub mod record;
pub mod store;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use payment::{Currency, PaymentBridge, PaymentIntent, SharedPaymentBridge};
pub use record::{
    Collection, DeleteAck, Document, Filter, InsertAck, InsertOutcome, ListOrder, RecordKey,
    Role, UpdateAck, EMAIL_FIELD, ID_FIELD, ROLE_FIELD,
};
pub use store::{BoundedStore, RecordStore, SharedStore};
