//! Capacity-bounded, ordered image galleries.
//!
//! A gallery holds the published URLs in display order plus the uploads started
//! for it. At selection time the two together never exceed the capacity; files
//! beyond the remaining slots are cut before any upload starts.

use folio_core::models::{FileHandle, GalleryKind, TrackedUpload, UploadBatch, UploadId};
use folio_core::{AppError, ErrorMetadata};
use folio_upload::{Selection, UploadTracker};

pub struct GallerySlotManager {
    kind: GalleryKind,
    capacity: usize,
    published: Vec<String>,
    uploads: UploadBatch,
    dragged: Option<usize>,
    load_error: Option<String>,
    warning: Option<String>,
}

impl GallerySlotManager {
    pub fn new(kind: GalleryKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            published: Vec::new(),
            uploads: UploadBatch::new(),
            dragged: None,
            load_error: None,
            warning: None,
        }
    }

    pub fn with_default_capacity(kind: GalleryKind) -> Self {
        Self::new(kind, kind.default_capacity())
    }

    pub fn kind(&self) -> GalleryKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn published(&self) -> &[String] {
        &self.published
    }

    pub fn uploads(&self) -> &UploadBatch {
        &self.uploads
    }

    pub(crate) fn uploads_mut(&mut self) -> &mut UploadBatch {
        &mut self.uploads
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Last capacity warning raised by a load or a selection
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged
    }

    /// Replace the published list with what the store holds. Images beyond the
    /// capacity are dropped and reported through `warning`.
    pub fn load_initial(&mut self, mut urls: Vec<String>) {
        self.warning = None;
        if urls.len() > self.capacity {
            let warning = format!(
                "Only {} of {} stored images loaded. Maximum {} images reached.",
                self.capacity,
                urls.len(),
                self.capacity
            );
            tracing::warn!(
                gallery = self.kind.label(),
                stored = urls.len(),
                capacity = self.capacity,
                "{}",
                warning
            );
            urls.truncate(self.capacity);
            self.warning = Some(warning);
        }
        self.published = urls;
        self.dragged = None;
        self.load_error = None;
    }

    /// The gallery could not be fetched; it stays empty but usable.
    pub fn load_failed(&mut self, reason: impl Into<String>) {
        self.published.clear();
        self.dragged = None;
        self.load_error = Some(reason.into());
    }

    /// Remove the published image at `index`. Uploads are left alone.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.published.len() {
            return None;
        }
        self.dragged = None;
        Some(self.published.remove(index))
    }

    pub fn begin_reorder(&mut self, source: usize) {
        if source < self.published.len() {
            self.dragged = Some(source);
        }
    }

    /// Drop the dragged image at `target`. Returns whether the order changed.
    pub fn complete_reorder(&mut self, target: usize) -> bool {
        let Some(source) = self.dragged.take() else {
            return false;
        };
        if source == target || source >= self.published.len() || target >= self.published.len() {
            return false;
        }
        let url = self.published.remove(source);
        self.published.insert(target, url);
        true
    }

    pub fn cancel_reorder(&mut self) {
        self.dragged = None;
    }

    /// Slots left for new uploads
    pub fn remaining_capacity(&self) -> usize {
        self.capacity
            .saturating_sub(self.published.len())
            .saturating_sub(self.uploads.len())
    }

    /// Gate `files` on the remaining slots and start uploads for the accepted ones.
    pub fn select_files(&mut self, files: Vec<FileHandle>, tracker: &mut UploadTracker) -> Selection {
        let selection = self.gate(files);
        if !selection.accepted.is_empty() {
            tracker.start(&mut self.uploads, selection.accepted.clone());
        }
        selection
    }

    /// Apply the capacity gate without starting anything and set the warning.
    pub fn gate(&mut self, files: Vec<FileHandle>) -> Selection {
        let requested = files.len();
        let remaining = self.remaining_capacity();
        let selection = Selection::gate(files, Some(remaining));

        self.warning = if requested == 0 {
            None
        } else if remaining == 0 {
            Some(
                AppError::CapacityExceeded {
                    capacity: self.capacity,
                }
                .client_message(),
            )
        } else if selection.is_truncated() {
            Some(format!(
                "Only {} of {} images added. Maximum {} images reached.",
                selection.accepted.len(),
                requested,
                self.capacity
            ))
        } else {
            None
        };

        if let Some(ref warning) = self.warning {
            tracing::warn!(
                gallery = self.kind.label(),
                requested,
                accepted = selection.accepted.len(),
                capacity = self.capacity,
                "{}",
                warning
            );
        }
        selection
    }

    /// Drop one entry from the upload list. A still-running exchange finishes
    /// unobserved.
    pub fn remove_upload(&mut self, id: UploadId) -> Option<TrackedUpload> {
        self.uploads.remove(id)
    }

    /// Published list after a successful save; uploads are cleared.
    pub(crate) fn commit(&mut self, published: Vec<String>) {
        self.published = published;
        self.uploads.clear();
        self.dragged = None;
        self.warning = None;
    }
}
