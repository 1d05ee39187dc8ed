//! # Record Store Trait
//!
//! The data-access contract every backend implements: a MongoDB store in
//! production, an in-memory store for tests and local runs.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              RecordStore (trait)             │
//! │  ├── find_many() / find_one()                │
//! │  ├── insert() / insert_if_absent()           │
//! │  ├── update() / upsert()                     │
//! │  ├── delete()                                │
//! │  └── close()                                 │
//! └──────────────────────────────────────────────┘
//!                       ▲
//!        ┌──────────────┼──────────────┐
//!  ┌─────┴──────┐ ┌─────┴──────┐ ┌─────┴──────┐
//!  │ MongoStore │ │MemoryStore │ │BoundedStore│
//!  └────────────┘ └────────────┘ └────────────┘
//! ```

use crate::error::{StoreError, StoreResult};
use crate::record::{
    Collection, DeleteAck, Document, Filter, InsertAck, InsertOutcome, ListOrder, RecordKey,
    UpdateAck,
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Core trait for record store backends.
///
/// Single-record writes are atomic. Nothing else is: `insert_if_absent`
/// is a check followed by an insert and two concurrent callers can both
/// observe "absent".
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records in `collection` matching `filter`.
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        order: ListOrder,
    ) -> StoreResult<Vec<Document>>;

    /// The single record addressed by `key`, if any.
    async fn find_one(&self, collection: Collection, key: &RecordKey)
        -> StoreResult<Option<Document>>;

    /// Append `record`, assigning a generated id.
    async fn insert(&self, collection: Collection, record: Document) -> StoreResult<InsertAck>;

    /// Set the fields of `patch` on the record addressed by `key`.
    /// When `create` is true and nothing matches, a record holding the key
    /// field and the patch is created.
    async fn write(
        &self,
        collection: Collection,
        key: &RecordKey,
        patch: Document,
        create: bool,
    ) -> StoreResult<UpdateAck>;

    /// Remove the record addressed by `key`.
    async fn delete(&self, collection: Collection, key: &RecordKey) -> StoreResult<DeleteAck>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;

    /// Update without creation.
    async fn update(
        &self,
        collection: Collection,
        key: &RecordKey,
        patch: Document,
    ) -> StoreResult<UpdateAck> {
        self.write(collection, key, patch, false).await
    }

    /// Update, creating the record when absent.
    async fn upsert(
        &self,
        collection: Collection,
        key: &RecordKey,
        patch: Document,
    ) -> StoreResult<UpdateAck> {
        self.write(collection, key, patch, true).await
    }

    /// Insert unless a record already matches `record` on every field of
    /// `unique_fields`, in which case that record is returned instead.
    async fn insert_if_absent(
        &self,
        collection: Collection,
        record: Document,
        unique_fields: &[&str],
    ) -> StoreResult<InsertOutcome> {
        let filter = Filter::from_fields(&record, unique_fields);
        let existing = self
            .find_many(collection, &filter, ListOrder::Natural)
            .await?;

        if let Some(found) = existing.into_iter().next() {
            debug!(%collection, "Matching record exists, skipping insert");
            return Ok(InsertOutcome::Existing(found));
        }

        let ack = self.insert(collection, record).await?;
        Ok(InsertOutcome::Inserted(ack))
    }
}

/// Type alias for a shared store handle (dynamic dispatch)
pub type SharedStore = Arc<dyn RecordStore>;

/// Decorator bounding every call of an inner store with a timeout.
///
/// An elapsed call yields `StoreError::Timeout`, which is retryable.
pub struct BoundedStore {
    inner: SharedStore,
    timeout: Duration,
}

impl BoundedStore {
    pub fn new(inner: SharedStore, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout = ?self.timeout, "Store call timed out");
                Err(StoreError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[async_trait]
impl RecordStore for BoundedStore {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        order: ListOrder,
    ) -> StoreResult<Vec<Document>> {
        self.bounded("find_many", self.inner.find_many(collection, filter, order))
            .await
    }

    async fn find_one(
        &self,
        collection: Collection,
        key: &RecordKey,
    ) -> StoreResult<Option<Document>> {
        self.bounded("find_one", self.inner.find_one(collection, key))
            .await
    }

    async fn insert(&self, collection: Collection, record: Document) -> StoreResult<InsertAck> {
        self.bounded("insert", self.inner.insert(collection, record))
            .await
    }

    async fn write(
        &self,
        collection: Collection,
        key: &RecordKey,
        patch: Document,
        create: bool,
    ) -> StoreResult<UpdateAck> {
        self.bounded("write", self.inner.write(collection, key, patch, create))
            .await
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> StoreResult<DeleteAck> {
        self.bounded("delete", self.inner.delete(collection, key))
            .await
    }

    async fn close(&self) -> StoreResult<()> {
        self.bounded("close", self.inner.close()).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
