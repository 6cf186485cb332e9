use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterError};

/// A stored document: a flat JSON object with camelCase field names.
pub type Document = Map<String, Value>;

/// The four collections of the store. Each has one unique key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Area,
    Manager,
    Department,
    Employee,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Area,
        Collection::Manager,
        Collection::Department,
        Collection::Employee,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Area => "areas",
            Collection::Manager => "managers",
            Collection::Department => "departments",
            Collection::Employee => "employees",
        }
    }

    pub fn key_field(&self) -> &'static str {
        match self {
            Collection::Area => "areaId",
            Collection::Manager => "managerId",
            Collection::Department => "departmentNumber",
            Collection::Employee => "employeeNumber",
        }
    }

    /// Sequential integer keys; Area keys are opaque strings.
    pub fn numeric_key(&self) -> bool {
        !matches!(self, Collection::Area)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::Area => "area",
            Collection::Manager => "manager",
            Collection::Department => "department",
            Collection::Employee => "employee",
        }
    }

    /// Render the key of `doc` the way the store indexes it.
    pub fn key_of(&self, doc: &Document) -> Result<String, StoreError> {
        match doc.get(self.key_field()) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(StoreError::MissingKey(*self)),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key {key} in {collection}")]
    DuplicateKey { collection: Collection, key: String },

    #[error("no numbers left after the highest key in {0}")]
    KeysExhausted(Collection),

    #[error("document in {0} has no usable key")]
    MissingKey(Collection),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Basic document primitives every backend provides. Each call is atomic on its own;
/// nothing spans calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Matching documents ordered by key.
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Fails with [`StoreError::DuplicateKey`] when the key is taken.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError>;

    /// Merge `changes` into every matching document. Returns the number of documents touched.
    async fn update(&self, collection: Collection, filter: &Filter, changes: &Document) -> Result<u64, StoreError>;

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    /// Largest integer stored under `field`, if any document has one.
    async fn max_number(&self, collection: Collection, field: &str) -> Result<Option<i64>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Order documents by their key: numerically for sequential keys, lexically otherwise.
pub(crate) fn sort_by_key(collection: Collection, docs: &mut [Document]) {
    let field = collection.key_field();
    if collection.numeric_key() {
        docs.sort_by_key(|d| d.get(field).and_then(Value::as_i64).unwrap_or(i64::MAX));
    } else {
        docs.sort_by(|a, b| {
            let ka = a.get(field).and_then(Value::as_str).unwrap_or_default();
            let kb = b.get(field).and_then(Value::as_str).unwrap_or_default();
            ka.cmp(kb)
        });
    }
}
