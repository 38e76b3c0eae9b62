//! Run with: `cargo test -p folio-services --test records_test`

mod helpers;

use helpers::*;
use folio_core::models::OperationStatus;
use folio_core::validation::{join_tags, parse_tags};
use folio_services::{Catalog, SubmitError, UploadTarget};
use folio_store::DocumentStore;
use std::sync::Arc;

#[test]
fn tags_parse_and_rejoin() {
    let tags = parse_tags("a, b ,, c");
    assert_eq!(tags, vec!["a", "b", "c"]);
    assert_eq!(parse_tags(&join_tags(&tags)), tags);
}

#[tokio::test]
async fn signed_in_project_submit_records_creator_and_resets() {
    let store = Arc::new(FlakyStore::new());
    let mut editor = editor(store.clone());
    assert!(editor.sign_in(EDITOR_EMAIL, EDITOR_PASSWORD).await);

    {
        let form = editor.project_form_mut();
        form.title = "Mosvold Villa".to_string();
        form.location = "Kristiansand".to_string();
        form.tags = "timber, coast ,, villa".to_string();
        form.category = "Residential".to_string();
        form.catchline = "A house between rock and sea".to_string();
    }
    editor.select_files(UploadTarget::Project, files(&["front.jpg", "bad.tif", "back.jpg"]));
    editor.settle_uploads().await;

    let id = editor.submit_project().await.unwrap();
    assert_eq!(
        editor.project_status(),
        &OperationStatus::Succeeded("Project added successfully!".to_string())
    );
    assert!(editor.project_form().title.is_empty());
    assert!(editor.project_form().uploads.is_empty());

    let doc = store.get("projects", &id).await.unwrap();
    assert_eq!(doc.string("createdBy"), Some(EDITOR_EMAIL));
    assert_eq!(doc.string_list("tags"), vec!["timber", "coast", "villa"]);
    assert_eq!(
        doc.string_list("imageUrls"),
        vec![
            "https://cdn.example.com/front.jpg",
            "https://cdn.example.com/back.jpg"
        ]
    );
    assert!(doc.string("createdAt").unwrap().ends_with('Z'));

    let catalog = Catalog::new(store);
    let found = catalog.find_project("Mosvold Villa").await.unwrap().unwrap();
    assert_eq!(found.location, "Kristiansand");
}

#[tokio::test]
async fn anonymous_proposed_submit_without_images() {
    let store = Arc::new(FlakyStore::new());
    let mut editor = editor(store.clone());

    editor.proposed_form_mut().title = "Harbour Pavilion".to_string();
    editor.proposed_form_mut().category = "hospitality".to_string();
    let id = editor.submit_proposed().await.unwrap();

    let doc = store.get("proposed", &id).await.unwrap();
    assert_eq!(doc.string("createdBy"), Some("anonymous"));
    assert_eq!(doc.string("category"), Some("Hospitality"));
    assert!(doc.string_list("imageUrls").is_empty());

    let catalog = Catalog::new(store);
    let listed = catalog
        .proposed_in(folio_core::models::Category::Hospitality)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn invalid_form_is_not_written() {
    let store = Arc::new(FlakyStore::new());
    let mut editor = editor(store.clone());
    editor.project_form_mut().title = "Untitled".to_string();

    let err = editor.submit_project().await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));
    assert_eq!(editor.project_status().error(), Some("Location is required"));
    assert_eq!(store.writes(), 0);
    assert_eq!(editor.project_form().title, "Untitled");
}

#[tokio::test]
async fn submit_waits_for_form_uploads() {
    let store = Arc::new(FlakyStore::new());
    let mut editor = editor(store.clone());
    editor.proposed_form_mut().title = "Dune House".to_string();
    editor.select_files(UploadTarget::Proposed, files(&["slow-1.jpg"]));

    let err = editor.submit_proposed().await.unwrap_err();
    assert!(matches!(err, SubmitError::UploadsInFlight { pending: 1 }));
    assert_eq!(store.writes(), 0);

    editor.settle_uploads().await;
    let id = editor.submit_proposed().await.unwrap();
    let doc = store.get("proposed", &id).await.unwrap();
    assert_eq!(doc.string_list("imageUrls").len(), 1);
}

#[tokio::test]
async fn store_failure_keeps_the_form() {
    let store = Arc::new(FlakyStore::new());
    let mut editor = editor(store.clone());
    editor.proposed_form_mut().title = "Dune House".to_string();
    editor.select_files(UploadTarget::Proposed, files(&["dune.jpg"]));
    editor.settle_uploads().await;

    store.fail_writes(true);
    assert!(editor.submit_proposed().await.is_err());
    assert_eq!(
        editor.proposed_status().error(),
        Some("Missing or insufficient permissions.")
    );
    assert_eq!(editor.proposed_form().title, "Dune House");
    assert_eq!(editor.proposed_form().uploads.completed_urls().len(), 1);
}

#[tokio::test]
async fn sign_in_failure_and_password_reset() {
    let mut editor = editor(Arc::new(FlakyStore::new()));
    assert!(!editor.sign_in(EDITOR_EMAIL, "wrong").await);
    assert_eq!(
        editor.sign_in_status().error(),
        Some("Invalid email or password")
    );
    assert!(!editor.session().is_signed_in());

    assert!(editor.send_password_reset(EDITOR_EMAIL).await);
    assert_eq!(
        editor.reset_status().success(),
        Some("Password reset email sent! Check your inbox.")
    );

    assert!(editor.sign_in(EDITOR_EMAIL, EDITOR_PASSWORD).await);
    editor.sign_out().await;
    assert!(editor.session().current().is_none());
}
