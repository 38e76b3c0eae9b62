//! Read side used by the public pages.

use folio_core::models::{Category, GalleryKind, PROJECTS_COLLECTION, PROPOSED_COLLECTION};
use folio_store::{Document, DocumentStore, StoreError, StoreResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Finished project as read back from the store.
///
/// Decoding is lenient: missing text fields are empty, non-list `tags` or
/// `imageUrls` read as empty lists and an unknown category is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedProject {
    pub id: String,
    pub title: String,
    pub location: String,
    pub tags: Vec<String>,
    pub category: Option<Category>,
    pub description: String,
    pub approach: String,
    pub catchline: String,
    pub image_urls: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
}

impl PublishedProject {
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| doc.string(field).unwrap_or_default().to_string();
        Self {
            id: doc.id.clone(),
            title: text("title"),
            location: text("location"),
            tags: doc.string_list("tags"),
            category: category_of(doc),
            description: text("description"),
            approach: text("approach"),
            catchline: text("catchline"),
            image_urls: doc.string_list("imageUrls"),
            created_by: doc.string("createdBy").map(str::to_string),
            created_at: doc.string("createdAt").map(str::to_string),
        }
    }

    /// First image, used as the card background
    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedProject {
    pub id: String,
    pub title: String,
    pub category: Option<Category>,
    pub image_urls: Vec<String>,
}

impl ProposedProject {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.string("title").unwrap_or_default().to_string(),
            category: category_of(doc),
            image_urls: doc.string_list("imageUrls"),
        }
    }
}

fn category_of(doc: &Document) -> Option<Category> {
    doc.string("category").and_then(|c| c.parse().ok())
}

pub struct Catalog {
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Landing slideshow URLs in display order; empty when never saved.
    pub async fn landing_images(&self) -> StoreResult<Vec<String>> {
        let kind = GalleryKind::LandingSlideshow;
        match self.store.get(kind.collection(), kind.document_id()).await {
            Ok(doc) => Ok(doc.string_list(kind.field())),
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn projects(&self) -> StoreResult<Vec<PublishedProject>> {
        let docs = self.store.list(PROJECTS_COLLECTION).await?;
        Ok(docs.iter().map(PublishedProject::from_document).collect())
    }

    /// Projects grouped by category. Every category is present, possibly empty;
    /// projects without a known category are left out.
    pub async fn projects_by_category(
        &self,
    ) -> StoreResult<BTreeMap<Category, Vec<PublishedProject>>> {
        let mut groups: BTreeMap<Category, Vec<PublishedProject>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

        for project in self.projects().await? {
            match project.category {
                Some(category) => groups.entry(category).or_default().push(project),
                None => tracing::debug!(
                    project_id = %project.id,
                    "Project without a known category left out of grouping"
                ),
            }
        }
        Ok(groups)
    }

    /// First project whose title matches exactly
    pub async fn find_project(&self, title: &str) -> StoreResult<Option<PublishedProject>> {
        let docs = self
            .store
            .query(PROJECTS_COLLECTION, "title", &Value::from(title))
            .await?;
        Ok(docs.first().map(PublishedProject::from_document))
    }

    /// Project named `title`, else the first project, else none
    pub async fn featured_project(&self, title: &str) -> StoreResult<Option<PublishedProject>> {
        if let Some(project) = self.find_project(title).await? {
            return Ok(Some(project));
        }
        Ok(self.projects().await?.into_iter().next())
    }

    pub async fn proposed_in(&self, category: Category) -> StoreResult<Vec<ProposedProject>> {
        let docs = self
            .store
            .query(PROPOSED_COLLECTION, "category", &Value::from(category.as_str()))
            .await?;
        Ok(docs.iter().map(ProposedProject::from_document).collect())
    }
}
