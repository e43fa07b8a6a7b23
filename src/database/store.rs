use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Stored document is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Slash-separated document or collection path, e.g. `users/u1/goals`
///
/// Every segment is validated so a caller-supplied id can never address a
/// document outside the collection it was meant for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    pub fn from_segments<I, S>(segments: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts = Vec::new();
        for segment in segments {
            let segment = segment.as_ref();
            if !Self::is_valid_segment(segment) {
                let mut attempted = parts.join("/");
                if !attempted.is_empty() {
                    attempted.push('/');
                }
                attempted.push_str(segment);
                return Err(StoreError::InvalidPath(attempted));
            }
            parts.push(segment.to_string());
        }

        if parts.is_empty() {
            return Err(StoreError::InvalidPath(String::new()));
        }
        Ok(Self(parts.join("/")))
    }

    /// `users/{user_id}`
    pub fn user(user_id: &str) -> Result<Self, StoreError> {
        Self::from_segments(["users", user_id])
    }

    /// `users/{user_id}/goals`
    pub fn goals(user_id: &str) -> Result<Self, StoreError> {
        Self::from_segments(["users", user_id, "goals"])
    }

    /// Child document path under this collection
    pub fn child(&self, id: &str) -> Result<Self, StoreError> {
        Self::from_segments(self.segments().chain(std::iter::once(id)))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last path segment, i.e. the document id for document paths
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Path of the enclosing collection (everything before the last segment)
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment.trim() == segment
            && !segment.contains('/')
            && segment != "."
            && segment != ".."
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document: its id plus the JSON object body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

/// Minimal document-store capability consumed by the resource handlers
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging and health output
    fn name(&self) -> &'static str;

    /// Read a single document, `None` when it does not exist
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document
    async fn set(&self, path: &DocPath, data: Map<String, Value>) -> Result<(), StoreError>;

    /// All documents directly inside a collection, in no guaranteed order
    async fn list(&self, collection: &DocPath) -> Result<Vec<Document>, StoreError>;

    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Reserve a fresh document path in a collection, the `collection(path).doc()` step
    fn new_doc(&self, collection: &DocPath) -> Result<DocPath, StoreError> {
        collection.child(&uuid::Uuid::new_v4().simple().to_string())
    }
}
