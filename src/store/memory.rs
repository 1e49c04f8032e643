//! In-memory document store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    assign_id, Collection, DeleteOutcome, Document, DocumentStore, Filter, InsertOutcome,
    UpdateOutcome, ID_FIELD,
};
use crate::error::{Error, Result};

/// Document store backed by process memory.
///
/// Used when no database URL is configured, and by the test suite.
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            collections: Arc::clone(&self.collections),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOutcome> {
        let id = assign_id(&mut doc);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        let by_id = Filter::by_id(&id);
        if docs.iter().any(|d| by_id.matches(d)) {
            return Err(Error::Store(format!(
                "duplicate {} '{}' in {}",
                ID_FIELD, id, collection
            )));
        }

        docs.push(doc);
        Ok(InsertOutcome::new(id))
    }

    async fn upsert_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) {
            let mut modified = false;
            for (key, value) in set {
                if key == ID_FIELD {
                    continue;
                }
                if doc.get(&key) != Some(&value) {
                    doc.insert(key, value);
                    modified = true;
                }
            }
            return Ok(UpdateOutcome::matched(modified));
        }

        let mut doc = filter.to_document();
        doc.remove(ID_FIELD);
        doc.extend(set.into_iter().filter(|(key, _)| key != ID_FIELD));
        let id = assign_id(&mut doc);
        docs.push(doc);
        Ok(UpdateOutcome::upserted(id))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteOutcome::new(0));
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteOutcome::new(1))
            }
            None => Ok(DeleteOutcome::new(0)),
        }
    }
}
