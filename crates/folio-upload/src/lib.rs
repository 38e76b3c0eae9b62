//! Folio Upload Library
//!
//! Sends selected images to the remote upload service and tracks every file of a
//! selection independently: per-file progress, per-file failure, and the resulting
//! public URLs in selection order.

pub mod client;
pub mod error;
pub mod progress;
pub mod tracker;

use async_trait::async_trait;
use folio_core::models::FileHandle;

pub use client::{load_file, UploadClient, UPLOAD_FIELD};
pub use error::{UploadError, UploadResult};
pub use progress::ProgressReporter;
pub use tracker::{route, Selection, UploadTracker};

/// Remote service that stores one file and returns its public URL
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Upload `file`, reporting byte progress through `progress`.
    async fn upload(&self, file: &FileHandle, progress: ProgressReporter) -> UploadResult<String>;
}
