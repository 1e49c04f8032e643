//! Document storage for users, homes and bookings

mod filter;
pub mod memory;
pub mod postgres;

pub use filter::Filter;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// A stored record: a flat JSON object
pub type Document = Map<String, Value>;

/// Identifier field assigned to inserted documents
pub const ID_FIELD: &str = "_id";

/// The three independent record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Homes,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Homes, Collection::Bookings];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Homes => "homes",
            Collection::Bookings => "bookings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of inserting one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertOutcome {
    pub fn new(inserted_id: String) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateOutcome {
    /// An existing document matched the filter
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// Nothing matched, so a new document was inserted
    pub fn upserted(id: String) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}

/// Result of deleting one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteOutcome {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Collection-oriented document store.
///
/// Every operation touches at most one collection. "First match" means first
/// in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// All documents matching `filter`, in insertion order
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Insert `doc`, assigning an `_id` if it has none
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOutcome>;

    /// Overwrite the top-level fields in `set` on the first match, or insert
    /// the filter's fields merged with `set` when nothing matches
    async fn upsert_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateOutcome>;

    /// Delete the first match
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome>;
}

/// Open the store described by `config`: PostgreSQL when a URL is set,
/// otherwise in-memory.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.url() {
        Some(url) => Ok(Arc::new(PostgresStore::connect(url).await?)),
        None => {
            tracing::warn!("No database URL configured, documents are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Generate a document identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ensure `doc` carries a string `_id` and return it
pub(crate) fn assign_id(doc: &mut Document) -> String {
    let id = match doc.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => new_id(),
        Some(other) => other.to_string(),
    };
    doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    id
}

/// Interpret a stored JSON value as a document
pub(crate) fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::Store(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}
