use crate::traits::{Document, DocumentStore, Fields, SetOptions, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process document store
///
/// Collections are kept in id order, which is also the order `list` returns.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a 20-character document id
    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..20].to_string()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = Self::generate_id();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        tracing::debug!(collection = %collection, document_id = %id, "Memory store document added");
        Ok(id)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        options: SetOptions,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.get_mut(id) {
            Some(existing) if options.merge => existing.extend(fields),
            _ => {
                docs.insert(id.to_string(), fields);
            }
        }

        tracing::debug!(
            collection = %collection,
            document_id = %id,
            merge = options.merge,
            "Memory store document written"
        );
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::to_fields;
    use serde_json::json;

    #[tokio::test]
    async fn add_then_get_and_query() {
        let store = MemoryStore::new();
        let id = store
            .add_document(
                "projects",
                to_fields(&json!({"title": "Mosvold Villa", "category": "Residential"})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(id.len(), 20);

        let doc = store.get("projects", &id).await.unwrap();
        assert_eq!(doc.string("title"), Some("Mosvold Villa"));

        let hits = store
            .query("projects", "title", &json!("Mosvold Villa"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store
            .query("projects", "title", &json!("Other"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("siteSettings", "landing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn overwrite_replaces_and_merge_extends() {
        let store = MemoryStore::new();
        store
            .set_document(
                "siteSettings",
                "landing",
                to_fields(&json!({"images": ["a", "b"], "note": "keep?"})).unwrap(),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();

        store
            .set_document(
                "siteSettings",
                "landing",
                to_fields(&json!({"images": ["c"]})).unwrap(),
                SetOptions::merge(),
            )
            .await
            .unwrap();
        let doc = store.get("siteSettings", "landing").await.unwrap();
        assert_eq!(doc.string_list("images"), vec!["c"]);
        assert_eq!(doc.string("note"), Some("keep?"));

        store
            .set_document(
                "siteSettings",
                "landing",
                to_fields(&json!({"images": ["d"]})).unwrap(),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();
        let doc = store.get("siteSettings", "landing").await.unwrap();
        assert_eq!(doc.string_list("images"), vec!["d"]);
        assert!(doc.get("note").is_none());
    }
}
