//! The editing panel as one object.
//!
//! `Editor` owns every piece of panel state (session, slideshow, both forms and
//! their uploads, one status per action) and is driven through `&mut self`, so
//! upload events are applied by the same owner that reads the state.

use crate::auth::{AuthProvider, SessionHandle};
use crate::events::{EventBus, PanelEvent};
use crate::gallery::GallerySlotManager;
use crate::publish::{PublishCoordinator, PublishError};
use crate::records::{
    ProjectForm, ProposedForm, RecordPublisher, SubmitError, PROJECT_SUCCESS_MESSAGE,
    PROPOSED_SUCCESS_MESSAGE,
};
use crate::status;
use folio_core::models::{FileHandle, GalleryKind, OperationStatus, UploadEvent};
use folio_core::Config;
use folio_store::DocumentStore;
use folio_upload::{route, Selection, UploadService, UploadTracker};
use std::sync::Arc;

pub const SIGN_IN_SUCCESS_MESSAGE: &str = "Logged in successfully!";
pub const RESET_SUCCESS_MESSAGE: &str = "Password reset email sent! Check your inbox.";

/// Which upload list a selection goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Slideshow,
    Project,
    Proposed,
}

pub struct Editor {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    session: SessionHandle,
    events: EventBus,
    tracker: UploadTracker,
    gallery: GallerySlotManager,
    publisher: PublishCoordinator,
    records: RecordPublisher,
    project_form: ProjectForm,
    proposed_form: ProposedForm,
    sign_in_status: OperationStatus,
    reset_status: OperationStatus,
    project_status: OperationStatus,
    proposed_status: OperationStatus,
}

impl Editor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        uploads: Arc<dyn UploadService>,
        auth: Arc<dyn AuthProvider>,
        config: &Config,
    ) -> Self {
        let events = EventBus::new();
        Self {
            tracker: UploadTracker::new(uploads, config.upload_timeout()),
            gallery: GallerySlotManager::new(
                GalleryKind::LandingSlideshow,
                config.slideshow_capacity,
            ),
            publisher: PublishCoordinator::new(Arc::clone(&store), events.clone()),
            records: RecordPublisher::new(Arc::clone(&store), events.clone()),
            store,
            auth,
            session: SessionHandle::new(),
            events,
            project_form: ProjectForm::default(),
            proposed_form: ProposedForm::default(),
            sign_in_status: OperationStatus::Idle,
            reset_status: OperationStatus::Idle,
            project_status: OperationStatus::Idle,
            proposed_status: OperationStatus::Idle,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn gallery(&self) -> &GallerySlotManager {
        &self.gallery
    }

    /// Direct access for remove and drag reordering
    pub fn gallery_mut(&mut self) -> &mut GallerySlotManager {
        &mut self.gallery
    }

    pub fn project_form(&self) -> &ProjectForm {
        &self.project_form
    }

    pub fn project_form_mut(&mut self) -> &mut ProjectForm {
        &mut self.project_form
    }

    pub fn proposed_form(&self) -> &ProposedForm {
        &self.proposed_form
    }

    pub fn proposed_form_mut(&mut self) -> &mut ProposedForm {
        &mut self.proposed_form
    }

    pub fn sign_in_status(&self) -> &OperationStatus {
        &self.sign_in_status
    }

    pub fn reset_status(&self) -> &OperationStatus {
        &self.reset_status
    }

    pub fn gallery_status(&self) -> &OperationStatus {
        self.publisher.status()
    }

    pub fn project_status(&self) -> &OperationStatus {
        &self.project_status
    }

    pub fn proposed_status(&self) -> &OperationStatus {
        &self.proposed_status
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> bool {
        self.sign_in_status = OperationStatus::InProgress;
        match self.auth.sign_in(email.trim(), password).await {
            Ok(session) => {
                self.store.authorize(Some(session.id_token.clone()));
                self.events
                    .publish(PanelEvent::SessionChanged(Some(session.email.clone())));
                self.session.set(Some(session));
                self.sign_in_status = OperationStatus::Succeeded(SIGN_IN_SUCCESS_MESSAGE.to_string());
                true
            }
            Err(e) => {
                self.sign_in_status = status::failed("sign in", e);
                false
            }
        }
    }

    pub async fn sign_out(&mut self) {
        if let Some(session) = self.session.current() {
            if let Err(e) = self.auth.sign_out(&session).await {
                tracing::warn!(error = %e, "Sign-out reported an error");
            }
        }
        self.store.authorize(None);
        self.session.set(None);
        self.sign_in_status = OperationStatus::Idle;
        self.events.publish(PanelEvent::SessionChanged(None));
    }

    pub async fn send_password_reset(&mut self, email: &str) -> bool {
        self.reset_status = OperationStatus::InProgress;
        match self.auth.send_password_reset(email.trim()).await {
            Ok(()) => {
                self.reset_status = OperationStatus::Succeeded(RESET_SUCCESS_MESSAGE.to_string());
                true
            }
            Err(e) => {
                self.reset_status = status::failed("password reset", e);
                false
            }
        }
    }

    pub async fn load_gallery(&mut self) {
        self.publisher.load(&mut self.gallery).await;
    }

    /// Start uploads for a selection. Slideshow selections are cut to the free slots.
    pub fn select_files(&mut self, target: UploadTarget, files: Vec<FileHandle>) -> Selection {
        match target {
            UploadTarget::Slideshow => self.gallery.select_files(files, &mut self.tracker),
            UploadTarget::Project => {
                let selection = Selection::gate(files, None);
                self.tracker
                    .start(&mut self.project_form.uploads, selection.accepted.clone());
                selection
            }
            UploadTarget::Proposed => {
                let selection = Selection::gate(files, None);
                self.tracker
                    .start(&mut self.proposed_form.uploads, selection.accepted.clone());
                selection
            }
        }
    }

    fn apply_upload_event(&mut self, event: UploadEvent) {
        let applied = route(
            &mut [
                self.gallery.uploads_mut(),
                &mut self.project_form.uploads,
                &mut self.proposed_form.uploads,
            ],
            &event,
        );
        if applied {
            self.events.publish(PanelEvent::Upload(event));
        }
    }

    /// Wait until every running upload has finished, applying events as they come
    pub async fn settle_uploads(&mut self) {
        tracing::debug!(running = self.tracker.running(), "Waiting for uploads");
        while let Some(event) = self.tracker.next_event().await {
            self.apply_upload_event(event);
        }
    }

    pub async fn save_gallery(&mut self) -> Result<Vec<String>, PublishError> {
        self.publisher.save(&mut self.gallery).await
    }

    pub async fn submit_project(&mut self) -> Result<String, SubmitError> {
        self.project_status = OperationStatus::InProgress;
        let session = self.session.current();
        let result = self
            .records
            .submit_project(&mut self.project_form, session.as_ref())
            .await;
        self.project_status = match &result {
            Ok(_) => OperationStatus::Succeeded(PROJECT_SUCCESS_MESSAGE.to_string()),
            Err(e) => status::failed("submit project", e.clone()),
        };
        result
    }

    pub async fn submit_proposed(&mut self) -> Result<String, SubmitError> {
        self.proposed_status = OperationStatus::InProgress;
        let session = self.session.current();
        let result = self
            .records
            .submit_proposed(&mut self.proposed_form, session.as_ref())
            .await;
        self.proposed_status = match &result {
            Ok(_) => OperationStatus::Succeeded(PROPOSED_SUCCESS_MESSAGE.to_string()),
            Err(e) => status::failed("submit proposed project", e.clone()),
        };
        result
    }
}
