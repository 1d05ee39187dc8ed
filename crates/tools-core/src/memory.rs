//! # In-Memory Record Store
//!
//! A `RecordStore` holding every collection in process memory.
//! Used by the router tests and by local runs with `RECORD_STORE=memory`.
//! Mirrors the Mongo semantics the API relies on: generated string ids,
//! `$set`-style patches, matched/modified counts and a unique user email.

use crate::error::{StoreError, StoreResult};
use crate::record::{
    Collection, DeleteAck, Document, Filter, InsertAck, ListOrder, RecordKey, UpdateAck,
    EMAIL_FIELD, ID_FIELD,
};
use crate::store::RecordStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Collections kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn key_matches(record: &Document, key: &RecordKey) -> bool {
        record.get(key.field()).and_then(Value::as_str) == Some(key.value())
    }

    fn email_taken(records: &[Document], email: &Value, except_id: Option<&Value>) -> bool {
        records.iter().any(|r| {
            r.get(EMAIL_FIELD) == Some(email) && (except_id.is_none() || r.get(ID_FIELD) != except_id)
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    #[instrument(skip(self, filter))]
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        order: ListOrder,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if order == ListOrder::NewestFirst {
            found.reverse();
        }

        debug!("Found {} records", found.len());
        Ok(found)
    }

    async fn find_one(
        &self,
        collection: Collection,
        key: &RecordKey,
    ) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.iter().find(|r| Self::key_matches(r, key)))
            .cloned())
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, collection: Collection, mut record: Document) -> StoreResult<InsertAck> {
        let id = Self::new_id();
        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();

        if collection == Collection::Users {
            if let Some(email) = record.get(EMAIL_FIELD) {
                if Self::email_taken(records, email, None) {
                    return Err(StoreError::Duplicate(format!("{}: {}", EMAIL_FIELD, email)));
                }
            }
        }

        records.push(record);
        debug!(id = %id, "Inserted record");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id,
        })
    }

    #[instrument(skip(self, patch), fields(key = %key))]
    async fn write(
        &self,
        collection: Collection,
        key: &RecordKey,
        mut patch: Document,
        create: bool,
    ) -> StoreResult<UpdateAck> {
        // The id of an existing record is immutable.
        patch.remove(ID_FIELD);

        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();

        if collection == Collection::Users {
            if let Some(email) = patch.get(EMAIL_FIELD) {
                let target_id = records
                    .iter()
                    .find(|r| Self::key_matches(r, key))
                    .and_then(|r| r.get(ID_FIELD));
                if Self::email_taken(records, email, target_id) {
                    return Err(StoreError::Duplicate(format!("{}: {}", EMAIL_FIELD, email)));
                }
            }
        }

        if let Some(record) = records.iter_mut().find(|r| Self::key_matches(r, key)) {
            let modified = patch
                .iter()
                .any(|(field, value)| record.get(field) != Some(value));
            for (field, value) in patch {
                record.insert(field, value);
            }
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !create {
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let mut record = Document::new();
        let id = match key {
            RecordKey::Id(id) => id.clone(),
            RecordKey::Email(email) => {
                record.insert(EMAIL_FIELD.to_string(), Value::String(email.clone()));
                Self::new_id()
            }
        };
        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        for (field, value) in patch {
            record.insert(field, value);
        }
        records.push(record);

        debug!(id = %id, "Upserted record");
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        })
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, collection: Collection, key: &RecordKey) -> StoreResult<DeleteAck> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(records) => match records.iter().position(|r| Self::key_matches(r, key)) {
                Some(index) => {
                    records.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
