//! Folio Services Layer
//!
//! The editing side of the studio site: the landing slideshow (slots, reordering,
//! saving), the project and proposed-project forms, editor sign-in, and the
//! read-only catalog used by the public pages. `Editor` ties them together for the
//! CLI.

pub mod auth;
pub mod catalog;
pub mod editor;
pub mod events;
pub mod gallery;
pub mod publish;
pub mod records;
pub mod status;

#[cfg(feature = "auth-firebase")]
pub use auth::FirebaseAuth;
pub use auth::{AuthError, AuthProvider, AuthResult, SessionHandle, StaticAuth};
pub use catalog::{Catalog, PublishedProject, ProposedProject};
pub use editor::{Editor, UploadTarget};
pub use events::{EventBus, PanelEvent};
pub use gallery::GallerySlotManager;
pub use publish::{merge_published, PublishCoordinator, PublishError};
pub use records::{ProjectForm, ProposedForm, RecordPublisher, SubmitError};
