//! # MongoDB Record Store
//!
//! `RecordStore` backed by a MongoDB database with one collection per
//! `Collection`. Records cross the boundary as JSON; ObjectIds are exposed
//! to callers as 24-character hex strings.

use crate::config::MongoConfig;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Database, IndexModel};
use serde_json::Value;
use std::time::Duration;
use tools_core::{
    Collection, DeleteAck, Document, Filter, InsertAck, ListOrder, RecordKey, RecordStore,
    StoreError, StoreResult, UpdateAck, EMAIL_FIELD, ID_FIELD,
};
use tracing::{debug, error, info, instrument};

/// MongoDB-backed record store
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect using `config` and make sure the users email index exists.
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(map_mongo_error)?;
        options.app_name = Some("HexaToolsBackend".to_string());
        options.max_pool_size = Some(config.pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connection_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.connection_timeout_secs));

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let db = client.database(&config.database);

        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(map_mongo_error)?;
        info!("Connected to MongoDB database {}", config.database);

        let store = Self { client, db };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection(Collection::Users)
            .create_index(index, None)
            .await
            .map_err(map_mongo_error)?;
        debug!("Ensured unique index on users.email");
        Ok(())
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<bson::Document> {
        self.db.collection::<bson::Document>(collection.as_str())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    #[instrument(skip(self, filter))]
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        order: ListOrder,
    ) -> StoreResult<Vec<Document>> {
        let query = filter_to_bson(filter)?;
        let options = match order {
            ListOrder::Natural => None,
            ListOrder::NewestFirst => Some(FindOptions::builder().sort(doc! { "_id": -1 }).build()),
        };

        let cursor = self
            .collection(collection)
            .find(query, options)
            .await
            .map_err(map_mongo_error)?;
        let docs: Vec<bson::Document> = cursor.try_collect().await.map_err(map_mongo_error)?;

        debug!("Found {} records", docs.len());
        docs.into_iter().map(from_bson_document).collect()
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn find_one(
        &self,
        collection: Collection,
        key: &RecordKey,
    ) -> StoreResult<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(key_to_bson(key), None)
            .await
            .map_err(map_mongo_error)?;

        found.map(from_bson_document).transpose()
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, collection: Collection, mut record: Document) -> StoreResult<InsertAck> {
        record.remove(ID_FIELD);
        let id = ObjectId::new();
        let mut document = json_to_bson(&record)?;
        document.insert(ID_FIELD, id);

        self.collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| {
                error!("Failed to insert into {}: {}", collection, e);
                map_mongo_error(e)
            })?;

        debug!(id = %id, "Inserted record");
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id.to_hex(),
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
        patch.remove(ID_FIELD);

        if patch.is_empty() {
            match key {
                // `$set` may not be empty; re-setting the natural key is a no-op.
                RecordKey::Email(email) => {
                    patch.insert(EMAIL_FIELD.to_string(), Value::String(email.clone()));
                }
                RecordKey::Id(_) => {
                    let found = self.find_one(collection, key).await?;
                    return Ok(UpdateAck {
                        acknowledged: true,
                        matched_count: u64::from(found.is_some()),
                        modified_count: 0,
                        upserted_count: 0,
                        upserted_id: None,
                    });
                }
            }
        }

        let update = doc! { "$set": json_to_bson(&patch)? };
        let options = UpdateOptions::builder().upsert(create).build();

        let result = self
            .collection(collection)
            .update_one(key_to_bson(key), update, options)
            .await
            .map_err(|e| {
                error!("Failed to update {} in {}: {}", key, collection, e);
                map_mongo_error(e)
            })?;

        let upserted_id = result.upserted_id.map(|id| bson_id_to_string(&id));
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        })
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, collection: Collection, key: &RecordKey) -> StoreResult<DeleteAck> {
        let result = self
            .collection(collection)
            .delete_one(key_to_bson(key), None)
            .await
            .map_err(map_mongo_error)?;

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn close(&self) -> StoreResult<()> {
        info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

// =============================================================================
// JSON <-> BSON conversion
// =============================================================================

/// A hex id addresses an ObjectId; anything else is matched as a plain string.
fn id_to_bson(raw: &str) -> Bson {
    ObjectId::parse_str(raw)
        .map(Bson::ObjectId)
        .unwrap_or_else(|_| Bson::String(raw.to_string()))
}

fn bson_id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn key_to_bson(key: &RecordKey) -> bson::Document {
    match key {
        RecordKey::Id(id) => doc! { "_id": id_to_bson(id) },
        RecordKey::Email(email) => doc! { "email": email.as_str() },
    }
}

fn json_to_bson(record: &Document) -> StoreResult<bson::Document> {
    bson::to_document(record)
        .map_err(|e| StoreError::Serialization(format!("BSON serialization error: {}", e)))
}

fn filter_to_bson(filter: &Filter) -> StoreResult<bson::Document> {
    let mut query = json_to_bson(filter.fields())?;
    if let Some(Bson::String(id)) = query.get(ID_FIELD).cloned() {
        query.insert(ID_FIELD, id_to_bson(&id));
    }
    Ok(query)
}

fn from_bson_document(mut document: bson::Document) -> StoreResult<Document> {
    let id = document.remove(ID_FIELD).map(|id| bson_id_to_string(&id));

    let mut record = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Serialization(format!(
                "Expected a JSON object, got {}",
                other
            )))
        }
    };

    if let Some(id) = id {
        record.insert(ID_FIELD.to_string(), Value::String(id));
    }
    Ok(record)
}

fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(_) if err.to_string().contains("E11000") => {
            StoreError::Duplicate(err.to_string())
        }
        ErrorKind::Authentication { .. } => {
            StoreError::Connection(format!("Authentication failed: {}", err))
        }
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
            StoreError::Connection(err.to_string())
        }
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            StoreError::Serialization(err.to_string())
        }
        _ => StoreError::Database(err.to_string()),
    }
}
