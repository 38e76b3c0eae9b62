//! Document store abstraction trait
//!
//! This module defines the DocumentStore trait that all store backends must implement.

use crate::StoreBackend;
use async_trait::async_trait;
use folio_core::AppError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Fields of one document
pub type Fields = serde_json::Map<String, Value>;

/// Store operation errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The store answered and refused the call; the message is the store's own.
    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Message suitable for the editor: the store's reason when it gave one, a
    /// generic message for transport failures.
    pub fn reason(&self) -> String {
        match self {
            StoreError::Rejected(msg) => msg.clone(),
            StoreError::Transport(_) => "Could not reach the document store".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => AppError::NotFound(path),
            StoreError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Store(other.reason()),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String field, or `None` when missing or not a string.
    pub fn string(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// List of strings. A missing or non-array field reads as empty; non-string
    /// entries are skipped.
    pub fn string_list(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Write behaviour of `set_document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOptions {
    /// Keep fields that are not part of the write instead of replacing the document
    pub merge: bool,
}

impl SetOptions {
    pub fn overwrite() -> Self {
        Self { merge: false }
    }

    pub fn merge() -> Self {
        Self { merge: true }
    }
}

/// Serialize a record into document fields. The value must serialize to an object.
pub fn to_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(StoreError::InvalidDocument(e.to_string())),
    }
}

/// Document store abstraction trait
///
/// All store backends (Firestore, in-memory) implement this trait, so the editing
/// services and the catalog never depend on a specific database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. Missing documents are `StoreError::NotFound`.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;

    /// All documents of a collection whose `field` equals `value`
    async fn query(&self, collection: &str, field: &str, value: &Value)
        -> StoreResult<Vec<Document>>;

    /// All documents of a collection
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Create a document with a store-assigned id and return that id
    async fn add_document(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Create or write a document at a known id
    ///
    /// Without `merge` the document is replaced wholesale; with `merge` only the given
    /// fields are written.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        options: SetOptions,
    ) -> StoreResult<()>;

    /// Present the signed-in editor's token on subsequent calls (`None` signs out).
    fn authorize(&self, _id_token: Option<String>) {}

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}
