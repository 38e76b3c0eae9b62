use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one selected file for the duration of an upload batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadId(pub Uuid);

impl UploadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a file picked by the editor.
///
/// The payload is immutable; clones share the same bytes and the same `UploadId`.
#[derive(Clone)]
pub struct FileHandle {
    id: UploadId,
    name: String,
    media_type: String,
    data: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            id: UploadId::new(),
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FileHandle {}

/// Media type for a file name, by extension. Falls back to `application/octet-stream`.
pub fn media_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// State of one tracked upload. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Pending,
    Uploading { progress: u8 },
    Completed { url: String },
    Failed { reason: String },
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Completed { .. } | UploadState::Failed { .. }
        )
    }
}

/// Percentage of `sent` over `total`, rounded to the nearest integer and capped at 100.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    ((sent * 100 + total / 2) / total) as u8
}

/// Client-side record of one file's journey through the upload service
#[derive(Debug, Clone)]
pub struct TrackedUpload {
    file: FileHandle,
    state: UploadState,
}

impl TrackedUpload {
    pub fn new(file: FileHandle) -> Self {
        Self {
            file,
            state: UploadState::Pending,
        }
    }

    pub fn id(&self) -> UploadId {
        self.file.id()
    }

    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn progress(&self) -> u8 {
        match self.state {
            UploadState::Pending | UploadState::Failed { .. } => 0,
            UploadState::Uploading { progress } => progress,
            UploadState::Completed { .. } => 100,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.state {
            UploadState::Completed { url } => Some(url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply an event for this upload. Events after a terminal state are ignored.
    fn apply(&mut self, event: &UploadEvent) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = match event {
            UploadEvent::Started { .. } => UploadState::Uploading { progress: 0 },
            UploadEvent::Progress { percent, .. } => UploadState::Uploading {
                progress: (*percent).min(100),
            },
            UploadEvent::Completed { url, .. } => UploadState::Completed { url: url.clone() },
            UploadEvent::Failed { reason, .. } => UploadState::Failed {
                reason: reason.clone(),
            },
        };
        true
    }
}

/// Transition reported by an in-flight upload exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { upload_id: UploadId },
    Progress { upload_id: UploadId, percent: u8 },
    Completed { upload_id: UploadId, url: String },
    Failed { upload_id: UploadId, reason: String },
}

impl UploadEvent {
    pub fn upload_id(&self) -> UploadId {
        match self {
            UploadEvent::Started { upload_id }
            | UploadEvent::Progress { upload_id, .. }
            | UploadEvent::Completed { upload_id, .. }
            | UploadEvent::Failed { upload_id, .. } => *upload_id,
        }
    }
}

/// Uploads started from one selection context, kept in selection order.
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    uploads: Vec<TrackedUpload>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register newly selected files as `Pending`.
    pub fn extend(&mut self, files: impl IntoIterator<Item = FileHandle>) {
        self.uploads.extend(files.into_iter().map(TrackedUpload::new));
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedUpload> {
        self.uploads.iter()
    }

    pub fn get(&self, id: UploadId) -> Option<&TrackedUpload> {
        self.uploads.iter().find(|u| u.id() == id)
    }

    pub fn contains(&self, id: UploadId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: UploadId) -> Option<TrackedUpload> {
        let position = self.uploads.iter().position(|u| u.id() == id)?;
        Some(self.uploads.remove(position))
    }

    pub fn clear(&mut self) {
        self.uploads.clear();
    }

    /// Apply an event to the upload it names. Returns false when the id is unknown
    /// (for example an entry removed while its exchange was still running).
    pub fn apply(&mut self, event: &UploadEvent) -> bool {
        let id = event.upload_id();
        match self.uploads.iter_mut().find(|u| u.id() == id) {
            Some(upload) => upload.apply(event),
            None => false,
        }
    }

    /// True when every upload is `Completed` or `Failed`.
    pub fn is_settled(&self) -> bool {
        self.uploads.iter().all(TrackedUpload::is_terminal)
    }

    pub fn in_flight(&self) -> usize {
        self.uploads.iter().filter(|u| !u.is_terminal()).count()
    }

    /// URLs of completed uploads, in selection order.
    pub fn completed_urls(&self) -> Vec<String> {
        self.uploads
            .iter()
            .filter_map(|u| u.url().map(str::to_string))
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &TrackedUpload> {
        self.uploads.iter().filter(|u| u.error().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileHandle {
        FileHandle::new(name, media_type_for(name), vec![0u8; 16])
    }

    #[test]
    fn progress_percent_rounds_to_nearest() {
        assert_eq!(progress_percent(0, 200), 0);
        assert_eq!(progress_percent(1, 200), 1);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(200, 200), 100);
        assert_eq!(progress_percent(500, 200), 100);
        assert_eq!(progress_percent(10, 0), 0);
    }

    #[test]
    fn media_type_by_extension() {
        assert_eq!(media_type_for("villa.JPG"), "image/jpeg");
        assert_eq!(media_type_for("plan.webp"), "image/webp");
        assert_eq!(media_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn upload_walks_through_states() {
        let mut batch = UploadBatch::new();
        let f = file("a.jpg");
        let id = f.id();
        batch.extend([f]);

        assert_eq!(batch.get(id).unwrap().state(), &UploadState::Pending);
        assert!(batch.apply(&UploadEvent::Started { upload_id: id }));
        assert!(batch.apply(&UploadEvent::Progress { upload_id: id, percent: 42 }));
        assert_eq!(batch.get(id).unwrap().progress(), 42);
        assert!(!batch.is_settled());

        assert!(batch.apply(&UploadEvent::Completed {
            upload_id: id,
            url: "https://cdn.example.com/a.jpg".to_string(),
        }));
        let upload = batch.get(id).unwrap();
        assert_eq!(upload.progress(), 100);
        assert_eq!(upload.url(), Some("https://cdn.example.com/a.jpg"));
        assert!(batch.is_settled());
    }

    #[test]
    fn failed_upload_resets_progress_and_ignores_late_events() {
        let mut batch = UploadBatch::new();
        let f = file("a.jpg");
        let id = f.id();
        batch.extend([f]);

        batch.apply(&UploadEvent::Progress { upload_id: id, percent: 80 });
        batch.apply(&UploadEvent::Failed {
            upload_id: id,
            reason: "File too large".to_string(),
        });
        let upload = batch.get(id).unwrap();
        assert_eq!(upload.progress(), 0);
        assert_eq!(upload.error(), Some("File too large"));

        assert!(!batch.apply(&UploadEvent::Progress { upload_id: id, percent: 90 }));
        assert_eq!(batch.get(id).unwrap().error(), Some("File too large"));
    }

    #[test]
    fn events_are_keyed_by_id_not_position() {
        let mut batch = UploadBatch::new();
        let a = file("a.jpg");
        let b = file("b.jpg");
        let (a_id, b_id) = (a.id(), b.id());
        batch.extend([a, b]);

        // Removing the first entry shifts positions; b's completion must still land on b.
        batch.remove(a_id);
        batch.apply(&UploadEvent::Completed {
            upload_id: b_id,
            url: "https://cdn.example.com/b.jpg".to_string(),
        });
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get(b_id).unwrap().url(), Some("https://cdn.example.com/b.jpg"));

        // Events for removed uploads are dropped.
        assert!(!batch.apply(&UploadEvent::Completed {
            upload_id: a_id,
            url: "https://cdn.example.com/a.jpg".to_string(),
        }));
    }

    #[test]
    fn completed_urls_follow_selection_order() {
        let mut batch = UploadBatch::new();
        let files: Vec<_> = ["1.jpg", "2.jpg", "3.jpg"].iter().map(|n| file(n)).collect();
        let ids: Vec<_> = files.iter().map(FileHandle::id).collect();
        batch.extend(files);

        // Completion order differs from selection order.
        batch.apply(&UploadEvent::Completed { upload_id: ids[2], url: "u3".to_string() });
        batch.apply(&UploadEvent::Failed { upload_id: ids[1], reason: "Upload failed".to_string() });
        batch.apply(&UploadEvent::Completed { upload_id: ids[0], url: "u1".to_string() });

        assert!(batch.is_settled());
        assert_eq!(batch.completed_urls(), vec!["u1".to_string(), "u3".to_string()]);
        assert_eq!(batch.failed().count(), 1);
    }
}
