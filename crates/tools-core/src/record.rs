//! # Record Types
//!
//! Collections, keys, filters and write acknowledgements shared by every
//! record store backend. Records themselves are free-form JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A stored record: a free-form JSON object
pub type Document = Map<String, Value>;

/// Field holding the generated unique id of a record
pub const ID_FIELD: &str = "_id";

/// Field holding the natural key of a user, and the owner of orders and reviews
pub const EMAIL_FIELD: &str = "email";

/// Field holding a user's role
pub const ROLE_FIELD: &str = "role";

/// The four independent record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Products,
    Orders,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Products,
        Collection::Orders,
        Collection::Reviews,
    ];

    /// Collection name in the backing store
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key addressing a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Generated unique id
    Id(String),
    /// Natural key of a user
    Email(String),
}

impl RecordKey {
    pub fn id(id: impl Into<String>) -> Self {
        RecordKey::Id(id.into())
    }

    pub fn email(email: impl Into<String>) -> Self {
        RecordKey::Email(email.into())
    }

    /// Name of the field this key matches on
    pub fn field(&self) -> &'static str {
        match self {
            RecordKey::Id(_) => ID_FIELD,
            RecordKey::Email(_) => EMAIL_FIELD,
        }
    }

    /// Value the field must equal
    pub fn value(&self) -> &str {
        match self {
            RecordKey::Id(v) | RecordKey::Email(v) => v,
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field(), self.value())
    }
}

/// Exact-match filter over any subset of fields.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Filter matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an exact-match condition
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Build a filter from the tuple of `fields` taken from `record`.
    ///
    /// Fields absent from the record must also be absent from matches,
    /// so they are recorded as `null`.
    pub fn from_fields(record: &Document, fields: &[&str]) -> Self {
        let fields = fields
            .iter()
            .map(|f| (f.to_string(), record.get(*f).cloned().unwrap_or(Value::Null)))
            .collect();
        Self { fields }
    }

    /// Build a filter from query parameters, keeping only `allowed` fields
    pub fn from_query(query: &HashMap<String, String>, allowed: &[&str]) -> Self {
        let fields = query
            .iter()
            .filter(|(k, _)| allowed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// True when every condition holds for `record`.
    /// A `null` condition matches a missing field.
    pub fn matches(&self, record: &Document) -> bool {
        self.fields.iter().all(|(field, expected)| {
            match record.get(field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }
}

/// Ordering applied to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Whatever order the store yields
    #[default]
    Natural,
    /// Descending insertion order
    NewestFirst,
}

/// Acknowledgement of an insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: String,
}

/// Acknowledgement of an update or upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

/// Acknowledgement of a delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Result of an insert-if-absent
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// No match existed; the record was inserted
    Inserted(InsertAck),
    /// A matching record already existed and is returned untouched
    Existing(Document),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// User role. A closed set; anything else reads as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Read the role of a user record, defaulting to `User`
    pub fn of(record: &Document) -> Role {
        match record.get(ROLE_FIELD).and_then(Value::as_str) {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
