//! Test helpers: scripted upload service, a store with switchable write failures
//! and an editor wired to both.

#![allow(dead_code)]

use async_trait::async_trait;
use folio_core::models::FileHandle;
use folio_core::{Config, StoreBackend};
use folio_services::{Editor, StaticAuth};
use folio_store::{
    Document, DocumentStore, Fields, MemoryStore, SetOptions, StoreError, StoreResult,
};
use folio_upload::{ProgressReporter, UploadError, UploadResult, UploadService};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const EDITOR_EMAIL: &str = "editor@studio.no";
pub const EDITOR_PASSWORD: &str = "correct-horse";

/// Upload service answering from the file name: names starting with `bad` are
/// rejected, names starting with `slow` wait before completing.
pub struct ScriptedUploads;

#[async_trait]
impl UploadService for ScriptedUploads {
    async fn upload(&self, file: &FileHandle, progress: ProgressReporter) -> UploadResult<String> {
        progress.report(file.len() / 2, file.len());
        if file.name().starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        if file.name().starts_with("bad") {
            return Err(UploadError::Rejected("Unsupported image format".to_string()));
        }
        progress.report(file.len(), file.len());
        Ok(format!("https://cdn.example.com/{}", file.name()))
    }
}

/// Memory store whose writes can be switched to fail
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Rejected(
                "Missing or insufficient permissions.".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.inner.get(collection, id).await
    }

    async fn query(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
        self.inner.query(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.inner.list(collection).await
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        self.check()?;
        self.inner.add_document(collection, fields).await
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        options: SetOptions,
    ) -> StoreResult<()> {
        self.check()?;
        self.inner.set_document(collection, id, fields, options).await
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

pub fn config() -> Config {
    Config {
        upload_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn editor(store: Arc<FlakyStore>) -> Editor {
    let auth = StaticAuth::new().with_account(EDITOR_EMAIL, EDITOR_PASSWORD);
    Editor::new(store, Arc::new(ScriptedUploads), Arc::new(auth), &config())
}

pub fn files(names: &[&str]) -> Vec<FileHandle> {
    names
        .iter()
        .map(|n| FileHandle::new(*n, "image/jpeg", vec![9u8; 1024]))
        .collect()
}

pub fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub async fn seed_landing(store: &FlakyStore, images: &[&str]) {
    let mut fields = Fields::new();
    fields.insert("images".to_string(), serde_json::json!(images));
    store
        .inner
        .set_document("siteSettings", "landing", fields, SetOptions::overwrite())
        .await
        .unwrap();
}
