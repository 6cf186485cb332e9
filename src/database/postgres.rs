use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool};
use tracing::{debug, info};

use super::manager::{DatabaseError, DatabaseManager};
use super::store::{Collection, Document, DocumentStore, StoreError};
use crate::filter::{Filter, FilterWhere, SqlParam};

/// Postgres-backed document store: one `(key TEXT PRIMARY KEY, doc JSONB)` table per collection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the collection tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for collection in Collection::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (key TEXT PRIMARY KEY, doc JSONB NOT NULL)",
                collection.table_name()
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        info!("Document tables ready");
        Ok(())
    }

    fn order_by(collection: Collection) -> String {
        if collection.numeric_key() {
            format!("(doc->>'{}')::bigint", collection.key_field())
        } else {
            "key".to_string()
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(DatabaseError::Sqlx(other)),
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let (where_clause, params) = FilterWhere::generate(filter, 0)?;
        let sql = format!(
            "SELECT doc FROM \"{}\" WHERE {} ORDER BY {}",
            collection.table_name(),
            where_clause,
            Self::order_by(collection)
        );
        debug!(%sql, "find");

        let mut q = sqlx::query_as::<_, (Value,)>(&sql);
        for p in params {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|(doc,)| match doc {
                Value::Object(map) => Ok(map),
                other => Err(StoreError::Database(DatabaseError::QueryError(format!(
                    "non-object document in {}: {}",
                    collection, other
                )))),
            })
            .collect()
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let key = collection.key_of(&doc)?;
        let sql = format!("INSERT INTO \"{}\" (key, doc) VALUES ($1, $2)", collection.table_name());
        let result = sqlx::query(&sql)
            .bind(&key)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateKey { collection, key })
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn update(&self, collection: Collection, filter: &Filter, changes: &Document) -> Result<u64, StoreError> {
        let (where_clause, params) = FilterWhere::generate(filter, 1)?;
        let sql = format!(
            "UPDATE \"{}\" SET doc = doc || $1::jsonb WHERE {}",
            collection.table_name(),
            where_clause
        );
        let mut q = sqlx::query(&sql).bind(Value::Object(changes.clone()));
        for p in params {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let (where_clause, params) = FilterWhere::generate(filter, 0)?;
        let sql = format!("DELETE FROM \"{}\" WHERE {}", collection.table_name(), where_clause);
        let mut q = sqlx::query(&sql);
        for p in params {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn max_number(&self, collection: Collection, field: &str) -> Result<Option<i64>, StoreError> {
        // Reuse filter validation for the field name before inlining it.
        Filter::eq(field, Value::Null).validate()?;
        let sql = format!(
            "SELECT MAX((doc->>'{}')::bigint) FROM \"{}\"",
            field,
            collection.table_name()
        );
        let (max,): (Option<i64>,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(max)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await.map_err(|e| match e {
            DatabaseError::Sqlx(err) => StoreError::from(err),
            other => StoreError::Database(other),
        })
    }
}

fn bind_param_query(
    q: sqlx::query::Query<'_, sqlx::Postgres, PgArguments>,
    p: SqlParam,
) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Json(v) => q.bind(v),
        SqlParam::Text(s) => q.bind(s),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    p: SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match p {
        SqlParam::Json(v) => q.bind(v),
        SqlParam::Text(s) => q.bind(s),
    }
}
