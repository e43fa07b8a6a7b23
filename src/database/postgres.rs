use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use std::time::Duration;
use tracing::info;

use super::store::{DocPath, Document, DocumentStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        path       TEXT PRIMARY KEY,
        parent     TEXT NOT NULL,
        doc_id     TEXT NOT NULL,
        data       JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const CREATE_PARENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_parent_idx ON documents (parent)";

/// Document store persisted as JSONB rows in a single PostgreSQL table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using the configured URL and make sure the table exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Backend("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!("Connected PostgreSQL document store");
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_PARENT_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    fn to_document(path: &str, id: String, data: Value) -> Result<Document, StoreError> {
        match data {
            Value::Object(map) => Ok(Document { id, data: map }),
            _ => Err(StoreError::NotAnObject(path.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT doc_id, data FROM documents WHERE path = $1")
            .bind(path.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id: String = row.try_get("doc_id")?;
                let Json(data): Json<Value> = row.try_get("data")?;
                Ok(Some(Self::to_document(path.as_str(), id, data)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError> {
        let parent = path.parent().unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO documents (path, parent, doc_id, data, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (path) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(path.as_str())
        .bind(parent)
        .bind(path.id())
        .bind(Json(Value::Object(data)))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, collection: &DocPath) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query("SELECT path, doc_id, data FROM documents WHERE parent = $1")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let path: String = row.try_get("path")?;
            let id: String = row.try_get("doc_id")?;
            let Json(data): Json<Value> = row.try_get("data")?;
            documents.push(Self::to_document(&path, id, data)?);
        }
        Ok(documents)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_rows_are_rejected() {
        let err = PgStore::to_document("users/u1", "u1".to_string(), json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject(p) if p == "users/u1"));
    }

    #[test]
    fn object_rows_become_documents() {
        let doc = PgStore::to_document("users/u1", "u1".to_string(), json!({"email": "x@y.z"})).unwrap();
        assert_eq!(doc.id, "u1");
        assert_eq!(doc.data["email"], "x@y.z");
    }

    #[tokio::test]
    async fn connect_without_url_fails_fast() {
        let config = crate::config::AppConfig::development().database;
        let result = PgStore::connect(&config).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
