use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{sort_by_key, Collection, Document, DocumentStore, StoreError};
use crate::filter::Filter;

/// In-process document store. Used by tests, `DATABASE_BACKEND=memory` and seeding dry runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        sort_by_key(collection, &mut docs);
        Ok(docs)
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let key = collection.key_of(&doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| collection.key_of(d).map(|k| k == key).unwrap_or(false)) {
            return Err(StoreError::DuplicateKey { collection, key });
        }
        docs.push(doc);
        Ok(())
    }

    async fn update(&self, collection: Collection, filter: &Filter, changes: &Document) -> Result<u64, StoreError> {
        filter.validate()?;
        let mut collections = self.collections.write().await;
        let mut touched = 0;
        if let Some(docs) = collections.get_mut(&collection) {
            for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
                for (field, value) in changes {
                    doc.insert(field.clone(), value.clone());
                }
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        filter.validate()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn max_number(&self, collection: Collection, field: &str) -> Result<Option<i64>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().filter_map(|d| d.get(field).and_then(Value::as_i64)).max()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
