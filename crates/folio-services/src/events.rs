//! Panel-wide notifications.
//!
//! Components publish what happened; pages and the CLI subscribe to what they care
//! about. A send with nobody listening is not an error.

use folio_core::models::{Category, GalleryKind, RecordKind, UploadEvent};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Upload(UploadEvent),
    GallerySaved { gallery: GalleryKind, count: usize },
    RecordSubmitted { kind: RecordKind, id: String },
    /// `Some(email)` after sign-in, `None` after sign-out
    SessionChanged(Option<String>),
    /// Ask category listings to open the given category
    FocusCategory(Category),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PanelEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: PanelEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Panel event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.sender.subscribe()
    }

    pub fn focus_category(&self, category: Category) {
        self.publish(PanelEvent::FocusCategory(category));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
