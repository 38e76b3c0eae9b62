//! HTTP client for the image upload service.
//!
//! One multipart `POST` per file with the payload in the `image` field. The service
//! answers `{"url": "..."}` on success and `{"error": "..."}` on failure.

use crate::error::{UploadError, UploadResult, GENERIC_FAILURE};
use crate::progress::ProgressReporter;
use crate::UploadService;
use async_trait::async_trait;
use bytes::Bytes;
use folio_core::models::{media_type_for, FileHandle};
use folio_core::Config;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "image";

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Upload service client
#[derive(Clone, Debug)]
pub struct UploadClient {
    client: Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> UploadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> UploadResult<Self> {
        Self::new(config.upload_url.clone(), config.upload_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn part(file: &FileHandle, progress: ProgressReporter) -> UploadResult<Part> {
        let data = file.data().clone();
        let total = data.len() as u64;
        let chunks: Vec<Bytes> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|start| data.slice(start..(start + CHUNK_SIZE).min(data.len())))
            .collect();

        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            progress.report(sent, total);
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            .map_err(|e| UploadError::InvalidFile(format!("{}: {}", file.name(), e)))
    }
}

/// Failure reason for a non-successful answer: the service's `error`, else the
/// status reason for non-2xx answers, else the generic message.
fn failure_reason(status: reqwest::StatusCode, body: &UploadResponse) -> String {
    if let Some(error) = body.error.as_deref().filter(|e| !e.is_empty()) {
        return error.to_string();
    }
    if !status.is_success() {
        if let Some(reason) = status.canonical_reason() {
            return reason.to_string();
        }
    }
    GENERIC_FAILURE.to_string()
}

#[async_trait]
impl UploadService for UploadClient {
    async fn upload(&self, file: &FileHandle, progress: ProgressReporter) -> UploadResult<String> {
        let start = Instant::now();
        let form = Form::new().part(UPLOAD_FIELD, Self::part(file, progress)?);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else {
                    UploadError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let body: UploadResponse = serde_json::from_str(&text).unwrap_or_default();

        match body.url {
            Some(ref url) if status.is_success() && !url.is_empty() => {
                tracing::info!(
                    upload_id = %file.id(),
                    file_name = %file.name(),
                    size_bytes = file.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Upload completed"
                );
                Ok(url.clone())
            }
            _ => {
                let reason = failure_reason(status, &body);
                tracing::warn!(
                    upload_id = %file.id(),
                    file_name = %file.name(),
                    status = status.as_u16(),
                    error = %reason,
                    "Upload rejected"
                );
                Err(UploadError::Rejected(reason))
            }
        }
    }
}

/// Read a local file into a handle ready for upload
pub async fn load_file(path: impl AsRef<Path>) -> UploadResult<FileHandle> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| UploadError::InvalidFile(format!("Invalid file name: {}", path.display())))?
        .to_string();

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| UploadError::InvalidFile(format!("Failed to read {}: {}", path.display(), e)))?;

    let media_type = media_type_for(&name);
    Ok(FileHandle::new(name, media_type, data))
}
