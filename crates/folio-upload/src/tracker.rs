//! Multi-file upload tracking.
//!
//! Every accepted file runs as its own task and reports `UploadEvent`s through one
//! channel. Events name the upload they belong to, so the owner of the batches
//! applies them by id and a failing file never touches its siblings.

use crate::error::UploadError;
use crate::progress::ProgressReporter;
use crate::UploadService;
use folio_core::models::{FileHandle, UploadBatch, UploadEvent, UploadId};
use folio_core::{AppError, ErrorMetadata};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Outcome of applying a slot limit to a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub accepted: Vec<FileHandle>,
    pub rejected: Vec<FileHandle>,
}

impl Selection {
    /// Keep the first `limit` files in selection order; `None` accepts everything.
    pub fn gate(mut files: Vec<FileHandle>, limit: Option<usize>) -> Self {
        let rejected = match limit {
            Some(limit) if files.len() > limit => files.split_off(limit),
            _ => Vec::new(),
        };
        Self {
            accepted: files,
            rejected,
        }
    }

    pub fn is_truncated(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Starts uploads and collects their events
pub struct UploadTracker {
    service: Arc<dyn UploadService>,
    timeout: Duration,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: mpsc::UnboundedReceiver<UploadEvent>,
    running: usize,
}

impl UploadTracker {
    pub fn new(service: Arc<dyn UploadService>, timeout: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            timeout,
            events_tx,
            events_rx,
            running: 0,
        }
    }

    /// Number of exchanges whose terminal event has not been received yet
    pub fn running(&self) -> usize {
        self.running
    }

    /// Register `files` as pending in `batch` and start one upload task per file.
    pub fn start(&mut self, batch: &mut UploadBatch, files: Vec<FileHandle>) -> Vec<UploadId> {
        batch.extend(files.iter().cloned());
        files.into_iter().map(|file| self.spawn(file)).collect()
    }

    fn spawn(&mut self, file: FileHandle) -> UploadId {
        let upload_id = file.id();
        let file_name = file.name().to_string();
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let timeout = self.timeout;
        self.running += 1;

        tracing::debug!(upload_id = %upload_id, file_name = %file_name, "Starting upload");

        tokio::spawn(async move {
            send(&events, UploadEvent::Started { upload_id });
            let progress = ProgressReporter::new(upload_id, events.clone());

            // Separate task: a panicking exchange comes back as a JoinError.
            let exchange = tokio::spawn(async move { service.upload(&file, progress).await });
            let abort = exchange.abort_handle();

            let result = match tokio::time::timeout(timeout, exchange).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => {
                    tracing::error!(
                        upload_id = %upload_id,
                        file_name = %file_name,
                        error = %join_error,
                        "Upload task aborted"
                    );
                    Err(UploadError::Transport(join_error.to_string()))
                }
                Err(_) => {
                    abort.abort();
                    Err(UploadError::Timeout)
                }
            };

            let event = match result {
                Ok(url) => UploadEvent::Completed { upload_id, url },
                Err(e) => {
                    let reason = e.reason();
                    let err = AppError::from(e);
                    tracing::warn!(
                        upload_id = %upload_id,
                        file_name = %file_name,
                        error_code = err.error_code(),
                        recoverable = err.is_recoverable(),
                        error = %err,
                        "Upload failed"
                    );
                    UploadEvent::Failed { upload_id, reason }
                }
            };
            send(&events, event);
        });

        upload_id
    }

    fn note(&mut self, event: &UploadEvent) {
        if matches!(
            event,
            UploadEvent::Completed { .. } | UploadEvent::Failed { .. }
        ) {
            self.running = self.running.saturating_sub(1);
        }
    }

    /// Wait for the next event. `None` once no upload is running.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        if self.running == 0 {
            return self.try_next_event();
        }
        let event = self.events_rx.recv().await?;
        self.note(&event);
        Some(event)
    }

    /// Take an already delivered event without waiting
    fn try_next_event(&mut self) -> Option<UploadEvent> {
        let event = self.events_rx.try_recv().ok()?;
        self.note(&event);
        Some(event)
    }

    /// Apply events to whichever batch holds their upload until no upload is
    /// running. Events for uploads no longer in any batch are dropped.
    pub async fn settle(&mut self, batches: &mut [&mut UploadBatch]) -> Vec<UploadEvent> {
        let mut applied = Vec::new();
        while let Some(event) = self.next_event().await {
            if route(batches, &event) {
                applied.push(event);
            }
        }
        applied
    }
}

pub(crate) fn send(events: &mpsc::UnboundedSender<UploadEvent>, event: UploadEvent) {
    if let Err(e) = events.send(event) {
        tracing::trace!(upload_id = %e.0.upload_id(), "Upload tracker dropped, event discarded");
    }
}

/// Apply an event to the first batch that knows its upload
pub fn route(batches: &mut [&mut UploadBatch], event: &UploadEvent) -> bool {
    batches
        .iter_mut()
        .find(|batch| batch.contains(event.upload_id()))
        .map(|batch| batch.apply(event))
        .unwrap_or(false)
}
