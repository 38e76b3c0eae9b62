use folio_core::models::{progress_percent, UploadEvent, UploadId};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Reports byte progress of one upload as `UploadEvent::Progress`.
///
/// Only changes of the rounded percentage are sent. Clones report for the same
/// upload and share the last reported value.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    upload_id: UploadId,
    events: UnboundedSender<UploadEvent>,
    last: Arc<AtomicU8>,
}

impl ProgressReporter {
    pub fn new(upload_id: UploadId, events: UnboundedSender<UploadEvent>) -> Self {
        Self {
            upload_id,
            events,
            last: Arc::new(AtomicU8::new(0)),
        }
    }

    pub fn upload_id(&self) -> UploadId {
        self.upload_id
    }

    /// Record that `sent` of `total` bytes have gone out
    pub fn report(&self, sent: u64, total: u64) {
        let percent = progress_percent(sent, total);
        let previous = self.last.swap(percent, Ordering::Relaxed);
        if previous == percent {
            return;
        }
        crate::tracker::send(
            &self.events,
            UploadEvent::Progress {
                upload_id: self.upload_id,
                percent,
            },
        );
    }
}
