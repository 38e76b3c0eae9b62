//! Project and proposed-project forms.
//!
//! A form holds the raw field text as typed plus the uploads started for it.
//! Submitting validates the fields, attaches the completed image URLs and the
//! creator, and adds one new document.

use crate::events::{EventBus, PanelEvent};
use chrono::Utc;
use folio_core::models::{
    creator_identity, Category, ProjectDraft, ProposedDraft, RecordKind, Session, UploadBatch,
};
use folio_core::validation::parse_tags;
use folio_core::AppError;
use folio_store::{to_fields, DocumentStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

pub const PROJECT_SUCCESS_MESSAGE: &str = "Project added successfully!";
pub const PROPOSED_SUCCESS_MESSAGE: &str = "Proposed project added successfully!";

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(String),

    #[error("Wait for {pending} upload(s) to finish before submitting")]
    UploadsInFlight { pending: usize },

    #[error("{}", .0.reason())]
    Store(#[from] StoreError),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(msg) => AppError::InvalidInput(msg),
            SubmitError::UploadsInFlight { pending } => AppError::UploadsInFlight { pending },
            SubmitError::Store(e) => e.into(),
        }
    }
}

/// First validation message, checking fields in form order
fn first_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let field_errors = errors.field_errors();
    order
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

fn parse_category(raw: &str) -> Result<Category, SubmitError> {
    raw.parse::<Category>()
        .map_err(|_| SubmitError::Invalid(format!("Unknown category: {}", raw.trim())))
}

/// Finished-project form
#[derive(Debug, Clone)]
pub struct ProjectForm {
    pub title: String,
    pub location: String,
    /// Comma-separated
    pub tags: String,
    pub category: String,
    pub description: String,
    pub approach: String,
    pub catchline: String,
    pub uploads: UploadBatch,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            location: String::new(),
            tags: String::new(),
            category: Category::default().to_string(),
            description: String::new(),
            approach: String::new(),
            catchline: String::new(),
            uploads: UploadBatch::new(),
        }
    }
}

impl ProjectForm {
    pub fn draft(&self) -> Result<ProjectDraft, SubmitError> {
        let draft = ProjectDraft {
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            tags: parse_tags(&self.tags),
            category: parse_category(&self.category)?,
            description: self.description.trim().to_string(),
            approach: self.approach.trim().to_string(),
            catchline: self.catchline.trim().to_string(),
        };
        draft
            .validate()
            .map_err(|e| SubmitError::Invalid(first_message(&e, &["title", "location"])))?;
        Ok(draft)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Proposed-project form
#[derive(Debug, Clone)]
pub struct ProposedForm {
    pub title: String,
    pub category: String,
    pub uploads: UploadBatch,
}

impl Default for ProposedForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: Category::default().to_string(),
            uploads: UploadBatch::new(),
        }
    }
}

impl ProposedForm {
    pub fn draft(&self) -> Result<ProposedDraft, SubmitError> {
        let draft = ProposedDraft {
            title: self.title.trim().to_string(),
            category: parse_category(&self.category)?,
        };
        draft
            .validate()
            .map_err(|e| SubmitError::Invalid(first_message(&e, &["title"])))?;
        Ok(draft)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Adds new content records to the store
pub struct RecordPublisher {
    store: Arc<dyn DocumentStore>,
    events: EventBus,
}

impl RecordPublisher {
    pub fn new(store: Arc<dyn DocumentStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    fn ensure_settled(uploads: &UploadBatch) -> Result<(), SubmitError> {
        match uploads.in_flight() {
            0 => Ok(()),
            pending => Err(SubmitError::UploadsInFlight { pending }),
        }
    }

    async fn add<T: Serialize>(&self, kind: RecordKind, record: &T) -> Result<String, SubmitError> {
        let fields = to_fields(record)?;
        let id = self.store.add_document(kind.collection(), fields).await?;
        tracing::info!(collection = kind.collection(), document_id = %id, "Record added");
        self.events.publish(PanelEvent::RecordSubmitted {
            kind,
            id: id.clone(),
        });
        Ok(id)
    }

    /// Submit a finished project. On success the form and its uploads are reset;
    /// on failure both are kept.
    #[tracing::instrument(skip_all, fields(title = %form.title.trim()))]
    pub async fn submit_project(
        &self,
        form: &mut ProjectForm,
        session: Option<&Session>,
    ) -> Result<String, SubmitError> {
        let draft = form.draft()?;
        Self::ensure_settled(&form.uploads)?;

        let record = draft.into_record(
            form.uploads.completed_urls(),
            creator_identity(session),
            Utc::now(),
        );
        let id = self.add(RecordKind::Project, &record).await?;
        form.reset();
        Ok(id)
    }

    #[tracing::instrument(skip_all, fields(title = %form.title.trim()))]
    pub async fn submit_proposed(
        &self,
        form: &mut ProposedForm,
        session: Option<&Session>,
    ) -> Result<String, SubmitError> {
        let draft = form.draft()?;
        Self::ensure_settled(&form.uploads)?;

        let record = draft.into_record(
            form.uploads.completed_urls(),
            creator_identity(session),
            Utc::now(),
        );
        let id = self.add(RecordKind::Proposed, &record).await?;
        form.reset();
        Ok(id)
    }
}
