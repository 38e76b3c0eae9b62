use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Collection holding finished projects
pub const PROJECTS_COLLECTION: &str = "projects";
/// Collection holding proposed (unbuilt) projects
pub const PROPOSED_COLLECTION: &str = "proposed";

/// Fixed project categories, in display order
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    Residential,
    Hospitality,
    Commercial,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Residential,
        Category::Hospitality,
        Category::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Residential => "Residential",
            Category::Hospitality => "Hospitality",
            Category::Commercial => "Commercial",
        }
    }
}

impl FromStr for Category {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::AppError::InvalidInput(format!(
                    "Unknown category '{}', expected one of Residential, Hospitality, Commercial",
                    s
                ))
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of content record a form produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Finished project
    Project,
    /// Proposed project
    Proposed,
}

impl RecordKind {
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Project => PROJECTS_COLLECTION,
            RecordKind::Proposed => PROPOSED_COLLECTION,
        }
    }
}

/// Finished project as persisted in the `projects` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub title: String,
    pub location: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub description: String,
    pub approach: String,
    pub catchline: String,
    pub image_urls: Vec<String>,
    pub created_by: String,
    pub created_at: String,
}

/// Proposed project as persisted in the `proposed` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedRecord {
    pub title: String,
    pub category: Category,
    pub image_urls: Vec<String>,
    pub created_by: String,
    pub created_at: String,
}

/// Timestamp format used for `createdAt` (UTC, millisecond precision, `Z` suffix)
pub fn creation_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validated scalar fields of a finished project, before images are attached
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProjectDraft {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub description: String,
    pub approach: String,
    pub catchline: String,
}

impl ProjectDraft {
    pub fn into_record(
        self,
        image_urls: Vec<String>,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ProjectRecord {
        ProjectRecord {
            title: self.title,
            location: self.location,
            tags: self.tags,
            category: self.category,
            description: self.description,
            approach: self.approach,
            catchline: self.catchline,
            image_urls,
            created_by,
            created_at: creation_timestamp(created_at),
        }
    }
}

/// Validated scalar fields of a proposed project
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProposedDraft {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub category: Category,
}

impl ProposedDraft {
    pub fn into_record(
        self,
        image_urls: Vec<String>,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ProposedRecord {
        ProposedRecord {
            title: self.title,
            category: self.category,
            image_urls,
            created_by,
            created_at: creation_timestamp(created_at),
        }
    }
}
