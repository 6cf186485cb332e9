use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::database::models::{from_document, to_document, Entity};
use crate::database::store::{Document, DocumentStore, StoreError};
use crate::filter::Filter;

/// Typed access to one collection of the document store.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub fn key_filter(key: &T::Key) -> Result<Filter, StoreError> {
        Ok(Filter::eq(T::COLLECTION.key_field(), serde_json::to_value(key)?))
    }

    pub async fn select_all(&self) -> Result<Vec<T>, StoreError> {
        self.select_any(Filter::all()).await
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, &filter)
            .await?
            .into_iter()
            .map(|doc| from_document(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn select_one(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        let mut found = self.select_any(Self::key_filter(key)?).await?;
        Ok(if found.is_empty() { None } else { Some(found.swap_remove(0)) })
    }

    pub async fn exists(&self, key: &T::Key) -> Result<bool, StoreError> {
        Ok(self.select_one(key).await?.is_some())
    }

    pub async fn count(&self, filter: Filter) -> Result<usize, StoreError> {
        Ok(self.store.find(T::COLLECTION, &filter).await?.len())
    }

    pub async fn insert(&self, record: &T) -> Result<(), StoreError> {
        self.store.insert(T::COLLECTION, to_document(record)?).await
    }

    /// Merge `changes` into the record with `key`. Returns false when no record matched.
    pub async fn update_one(&self, key: &T::Key, changes: Document) -> Result<bool, StoreError> {
        if changes.is_empty() {
            return self.exists(key).await;
        }
        Ok(self.store.update(T::COLLECTION, &Self::key_filter(key)?, &changes).await? > 0)
    }

    pub async fn update_where(&self, filter: Filter, changes: Document) -> Result<u64, StoreError> {
        self.store.update(T::COLLECTION, &filter, &changes).await
    }

    /// Set `field` to null on every record where it equals `value`.
    pub async fn detach(&self, field: &str, value: Value) -> Result<u64, StoreError> {
        let mut changes = Document::new();
        changes.insert(field.to_string(), Value::Null);
        self.update_where(Filter::eq(field, value), changes).await
    }

    pub async fn delete_one(&self, key: &T::Key) -> Result<bool, StoreError> {
        Ok(self.store.delete(T::COLLECTION, &Self::key_filter(key)?).await? > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        self.store.delete(T::COLLECTION, &Filter::all()).await
    }

    /// `max(key) + 1`, or 1 for an empty collection. Not race-free: two concurrent
    /// creates can compute the same number, and the store's unique key rejects the loser.
    pub async fn next_number(&self) -> Result<i64, StoreError> {
        match self.store.max_number(T::COLLECTION, T::COLLECTION.key_field()).await? {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(StoreError::KeysExhausted(T::COLLECTION)),
        }
    }
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}
