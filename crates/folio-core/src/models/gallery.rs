use serde::{Deserialize, Serialize};

/// Display surfaces backed by a capacity-bounded, ordered image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryKind {
    /// Full-screen slideshow on the landing page
    LandingSlideshow,
}

impl GalleryKind {
    pub fn default_capacity(&self) -> usize {
        match self {
            GalleryKind::LandingSlideshow => 6,
        }
    }

    /// Collection holding the gallery document
    pub fn collection(&self) -> &'static str {
        match self {
            GalleryKind::LandingSlideshow => "siteSettings",
        }
    }

    pub fn document_id(&self) -> &'static str {
        match self {
            GalleryKind::LandingSlideshow => "landing",
        }
    }

    /// Field of the gallery document holding the ordered URL list
    pub fn field(&self) -> &'static str {
        match self {
            GalleryKind::LandingSlideshow => "images",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GalleryKind::LandingSlideshow => "landing images",
        }
    }
}
