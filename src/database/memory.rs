use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{DocPath, Document, DocumentStore, StoreError};

/// Process-local document store used in development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<DocPath, Map<String, Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across all collections
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.get(path).map(|data| Document {
            id: path.id().to_string(),
            data: data.clone(),
        }))
    }

    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.insert(path.clone(), data);
        Ok(())
    }

    async fn list(&self, collection: &DocPath) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|(path, _)| path.parent() == Some(collection.as_str()))
            .map(|(path, data)| Document {
                id: path.id().to_string(),
                data: data.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_document() {
        let store = MemoryStore::new();
        let path = DocPath::user("nobody").unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_document_with_id() {
        let store = MemoryStore::new();
        let path = DocPath::user("u1").unwrap();
        store.set(&path, object(json!({"email": "a@b.c"}))).await.unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.id, "u1");
        assert_eq!(doc.data["email"], "a@b.c");
    }

    #[tokio::test]
    async fn list_only_returns_direct_children() {
        let store = MemoryStore::new();
        let goals = DocPath::goals("u1").unwrap();
        let other = DocPath::goals("u2").unwrap();

        store.set(&goals.child("g1").unwrap(), object(json!({"title": "a"}))).await.unwrap();
        store.set(&goals.child("g2").unwrap(), object(json!({"title": "b"}))).await.unwrap();
        store.set(&other.child("g3").unwrap(), object(json!({"title": "c"}))).await.unwrap();
        store.set(&DocPath::user("u1").unwrap(), object(json!({}))).await.unwrap();

        let mut ids: Vec<String> = store.list(&goals).await.unwrap().into_iter().map(|d| d.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["g1", "g2"]);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn new_doc_generates_distinct_ids() {
        let store = MemoryStore::new();
        let goals = DocPath::goals("u1").unwrap();
        let a = store.new_doc(&goals).unwrap();
        let b = store.new_doc(&goals).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some("users/u1/goals"));
        assert!(!a.id().is_empty());
    }
}
