//! Firestore REST backend
//!
//! Talks to the Cloud Firestore v1 REST API. Reads use the project's web API key;
//! writes additionally present the signed-in editor's ID token so the database's
//! security rules can authorize them.

mod value;

pub use value::{decode_fields, decode_value, encode_fields, encode_value};

use crate::traits::{Document, DocumentStore, Fields, SetOptions, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::RwLock;
use std::time::Duration;

const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";
const LIST_PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct FirestoreErrorBody {
    error: FirestoreErrorDetail,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    #[serde(default)]
    document: Option<RawDocument>,
}

/// Firestore document store
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    api_key: String,
    id_token: RwLock<Option<String>>,
}

impl FirestoreStore {
    /// Create a store for `project_id` against the public Firestore endpoint
    ///
    /// # Arguments
    /// * `project_id` - Google Cloud project id (e.g. "studio-site")
    /// * `database` - database id, usually "(default)"
    /// * `api_key` - web API key of the project
    /// * `timeout` - per-request timeout
    pub fn new(
        project_id: &str,
        database: &str,
        api_key: String,
        timeout: Duration,
    ) -> StoreResult<Self> {
        Self::with_endpoint(FIRESTORE_ENDPOINT, project_id, database, api_key, timeout)
    }

    /// Create a store against a custom endpoint (emulator or test server)
    pub fn with_endpoint(
        endpoint: &str,
        project_id: &str,
        database: &str,
        api_key: String,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(FirestoreStore {
            client,
            documents_url: format!(
                "{}/v1/projects/{}/databases/{}/documents",
                endpoint.trim_end_matches('/'),
                project_id,
                database
            ),
            api_key,
            id_token: RwLock::new(None),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url,
            urlencoding::encode(collection),
            urlencoding::encode(id)
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, urlencoding::encode(collection))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .query(&[("key", self.api_key.as_str())]);

        let token = self
            .id_token
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> StoreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<FirestoreErrorBody>(&body) {
            Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
            Ok(parsed) if !parsed.error.status.is_empty() => parsed.error.status,
            _ => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        tracing::warn!(
            status = status.as_u16(),
            path = %path,
            error = %message,
            "Firestore request rejected"
        );
        Err(StoreError::Rejected(message))
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> StoreResult<T> {
        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidDocument(format!("Unreadable response: {}", e)))
    }
}

/// Last segment of a document resource name
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn into_document(raw: RawDocument) -> StoreResult<Document> {
    let fields = match raw.fields {
        Some(fields) => decode_fields(&fields)?,
        None => Fields::new(),
    };
    Ok(Document::new(document_id(&raw.name), fields))
}

/// Quote a field name for an update mask unless it is a plain identifier
fn field_path(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let path = format!("{}/{}", collection, id);
        let request = self.request(Method::GET, &self.document_url(collection, id));
        let response = self.send(request, &path).await?;
        into_document(Self::json(response).await?)
    }

    #[tracing::instrument(skip(self, value))]
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let body = json!({
            "structuredQuery": {
                "from": [ { "collectionId": collection } ],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field_path(field) },
                        "op": "EQUAL",
                        "value": encode_value(value),
                    }
                }
            }
        });

        let url = format!("{}:runQuery", self.documents_url);
        let request = self.request(Method::POST, &url).json(&body);
        let response = self.send(request, collection).await?;
        let entries: Vec<RunQueryEntry> = Self::json(response).await?;

        entries
            .into_iter()
            .filter_map(|entry| entry.document)
            .map(into_document)
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &self.collection_url(collection))
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = self.send(request, collection).await?;
            let page: ListResponse = Self::json(response).await?;
            for raw in page.documents {
                documents.push(into_document(raw)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(collection = %collection, count = documents.len(), "Firestore list complete");
        Ok(documents)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn add_document(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let body = json!({ "fields": encode_fields(&fields) });
        let request = self
            .request(Method::POST, &self.collection_url(collection))
            .json(&body);
        let response = self.send(request, collection).await?;
        let created: RawDocument = Self::json(response).await?;
        let id = document_id(&created.name).to_string();

        tracing::info!(collection = %collection, document_id = %id, "Firestore document created");
        Ok(id)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        options: SetOptions,
    ) -> StoreResult<()> {
        let path = format!("{}/{}", collection, id);
        let mut request = self.request(Method::PATCH, &self.document_url(collection, id));

        if options.merge {
            let mask: Vec<(&str, String)> = fields
                .keys()
                .map(|key| ("updateMask.fieldPaths", field_path(key)))
                .collect();
            request = request.query(&mask);
        }

        let body = json!({ "fields": encode_fields(&fields) });
        // A missing document is created by PATCH, so NotFound here means the
        // collection path itself is wrong.
        self.send(request.json(&body), &path).await?;

        tracing::info!(
            collection = %collection,
            document_id = %id,
            merge = options.merge,
            field_count = fields.len(),
            "Firestore document written"
        );
        Ok(())
    }

    fn authorize(&self, id_token: Option<String>) {
        if let Ok(mut guard) = self.id_token.write() {
            *guard = id_token;
        }
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Firestore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_fields;
    use mockito::Matcher;

    fn store(server: &mockito::Server) -> FirestoreStore {
        FirestoreStore::with_endpoint(
            &server.url(),
            "studio-site",
            "(default)",
            "test-key".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn field_paths_are_quoted_when_needed() {
        assert_eq!(field_path("images"), "images");
        assert_eq!(field_path("image_urls"), "image_urls");
        assert_eq!(field_path("cover image"), "`cover image`");
        assert_eq!(field_path("1st"), "`1st`");
    }

    #[tokio::test]
    async fn get_decodes_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"/documents/siteSettings/landing".to_string()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "projects/studio-site/databases/(default)/documents/siteSettings/landing",
                    "fields": { "images": { "arrayValue": { "values": [
                        { "stringValue": "https://cdn.example.com/1.jpg" }
                    ] } } }
                }"#,
            )
            .create_async()
            .await;

        let doc = store(&server).get("siteSettings", "landing").await.unwrap();
        assert_eq!(doc.id, "landing");
        assert_eq!(doc.string_list("images"), vec!["https://cdn.example.com/1.jpg"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_missing_document_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex(r"/documents/siteSettings/landing".to_string()))
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"Document not found","status":"NOT_FOUND"}}"#)
            .create_async()
            .await;

        let err = store(&server).get("siteSettings", "landing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn overwrite_sends_bearer_token_and_no_update_mask() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", Matcher::Regex(r"/documents/siteSettings/landing".to_string()))
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_header("authorization", "Bearer editor-token")
            .match_body(Matcher::Json(serde_json::json!({
                "fields": { "images": { "arrayValue": { "values": [
                    { "stringValue": "a.jpg" }
                ] } } }
            })))
            .with_status(200)
            .with_body(r#"{"name":"projects/studio-site/databases/(default)/documents/siteSettings/landing"}"#)
            .create_async()
            .await;

        let store = store(&server);
        store.authorize(Some("editor-token".to_string()));
        store
            .set_document(
                "siteSettings",
                "landing",
                to_fields(&serde_json::json!({ "images": ["a.jpg"] })).unwrap(),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_write_reports_store_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PATCH", Matcher::Regex(r"/documents/siteSettings/landing".to_string()))
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let err = store(&server)
            .set_document(
                "siteSettings",
                "landing",
                to_fields(&serde_json::json!({ "images": [] })).unwrap(),
                SetOptions::overwrite(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "Missing or insufficient permissions.");
    }

    #[tokio::test]
    async fn add_document_returns_assigned_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(r"/documents/projects$".to_string()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"name":"projects/studio-site/databases/(default)/documents/projects/Xy12AbCdEf"}"#)
            .create_async()
            .await;

        let id = store(&server)
            .add_document(
                "projects",
                to_fields(&serde_json::json!({ "title": "Mosvold Villa" })).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(id, "Xy12AbCdEf");
    }

    #[tokio::test]
    async fn query_skips_entries_without_documents() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(r"/documents:runQuery".to_string()))
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "structuredQuery": { "from": [ { "collectionId": "proposed" } ] }
            })))
            .with_status(200)
            .with_body(
                r#"[
                    { "document": {
                        "name": "projects/studio-site/databases/(default)/documents/proposed/p1",
                        "fields": { "title": { "stringValue": "Harbour Pavilion" } }
                    }, "readTime": "2024-03-01T12:00:00Z" },
                    { "readTime": "2024-03-01T12:00:00Z" }
                ]"#,
            )
            .create_async()
            .await;

        let docs = store(&server)
            .query("proposed", "category", &serde_json::json!("Hospitality"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "p1");
        assert_eq!(docs[0].string("title"), Some("Harbour Pavilion"));
    }

    #[tokio::test]
    async fn list_follows_page_tokens() {
        let mut server = mockito::Server::new_async().await;
        let _page_one = server
            .mock("GET", Matcher::Regex(r"/documents/projects$".to_string()))
            .match_query(Matcher::Exact("key=test-key&pageSize=300".to_string()))
            .with_status(200)
            .with_body(
                r#"{ "documents": [
                    { "name": "x/documents/projects/a", "fields": { "title": { "stringValue": "A" } } }
                ], "nextPageToken": "page-2" }"#,
            )
            .create_async()
            .await;
        let _page_two = server
            .mock("GET", Matcher::Regex(r"/documents/projects$".to_string()))
            .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
            .with_status(200)
            .with_body(
                r#"{ "documents": [
                    { "name": "x/documents/projects/b", "fields": { "title": { "stringValue": "B" } } }
                ] }"#,
            )
            .create_async()
            .await;

        let docs = store(&server).list("projects").await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
