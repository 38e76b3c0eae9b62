//! Loading and saving gallery documents.
//!
//! A save merges the published list with the completed uploads, cuts the result
//! to capacity and writes it as the whole document. Local state only changes once
//! the store has accepted the write.

use crate::events::{EventBus, PanelEvent};
use crate::gallery::GallerySlotManager;
use crate::status;
use folio_core::models::OperationStatus;
use folio_core::AppError;
use folio_store::{DocumentStore, Fields, SetOptions, StoreError};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

pub const SAVE_SUCCESS_MESSAGE: &str = "Landing images saved successfully!";
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to fetch landing images";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Wait for {pending} upload(s) to finish before saving")]
    UploadsInFlight { pending: usize },

    #[error("{}", .0.reason())]
    Store(#[from] StoreError),
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::UploadsInFlight { pending } => AppError::UploadsInFlight { pending },
            PublishError::Store(e) => e.into(),
        }
    }
}

/// Published URLs followed by completed uploads, cut to `capacity`.
pub fn merge_published(published: &[String], completed: Vec<String>, capacity: usize) -> Vec<String> {
    published
        .iter()
        .cloned()
        .chain(completed)
        .take(capacity)
        .collect()
}

pub struct PublishCoordinator {
    store: Arc<dyn DocumentStore>,
    events: EventBus,
    status: OperationStatus,
}

impl PublishCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            status: OperationStatus::Idle,
        }
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    /// Fetch the gallery document. A missing document is an empty gallery.
    #[tracing::instrument(skip(self, gallery), fields(gallery = gallery.kind().label()))]
    pub async fn load(&self, gallery: &mut GallerySlotManager) {
        let kind = gallery.kind();
        match self.store.get(kind.collection(), kind.document_id()).await {
            Ok(doc) => {
                let urls = doc.string_list(kind.field());
                tracing::debug!(count = urls.len(), "Gallery loaded");
                gallery.load_initial(urls);
            }
            Err(StoreError::NotFound(_)) => gallery.load_initial(Vec::new()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load gallery");
                gallery.load_failed(LOAD_FAILURE_MESSAGE);
            }
        }
    }

    /// Write published + completed uploads as the new gallery document.
    #[tracing::instrument(skip(self, gallery), fields(gallery = gallery.kind().label()))]
    pub async fn save(&mut self, gallery: &mut GallerySlotManager) -> Result<Vec<String>, PublishError> {
        let pending = gallery.uploads().in_flight();
        if pending > 0 {
            self.status = status::failed("save gallery", PublishError::UploadsInFlight { pending });
            return Err(PublishError::UploadsInFlight { pending });
        }

        self.status = OperationStatus::InProgress;
        let start = Instant::now();
        let kind = gallery.kind();
        let merged = merge_published(
            gallery.published(),
            gallery.uploads().completed_urls(),
            gallery.capacity(),
        );

        let mut fields = Fields::new();
        fields.insert(kind.field().to_string(), json!(merged));
        let write = self.store.set_document(
            kind.collection(),
            kind.document_id(),
            fields,
            SetOptions::overwrite(),
        );

        match write.await {
            Ok(()) => {
                tracing::info!(
                    count = merged.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Gallery saved"
                );
                gallery.commit(merged.clone());
                self.status = OperationStatus::Succeeded(SAVE_SUCCESS_MESSAGE.to_string());
                self.events.publish(PanelEvent::GallerySaved {
                    gallery: kind,
                    count: merged.len(),
                });
                Ok(merged)
            }
            Err(e) => {
                self.status = status::failed("save gallery", e.clone());
                Err(e.into())
            }
        }
    }
}
