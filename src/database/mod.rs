pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DocPath, Document, DocumentStore, StoreError};

use crate::config::DatabaseConfig;

/// Pick the backend from config: PostgreSQL when a URL is set, memory otherwise
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.url {
        Some(_) => Ok(Arc::new(PgStore::connect(config).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
