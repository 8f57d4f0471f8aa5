use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infers the media kind from a MIME type. Anything outside `image/*`
    /// and `video/*` is rejected at upload time.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// One stored binary payload plus its metadata record.
///
/// The `id` is issued by the blob backend at creation and never changes for
/// the lifetime of the asset, including across content replacement. External
/// content entities (services, blog posts) hold only this id.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Asset {
    #[schema(example = "a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "ocean-sunrise.jpg")]
    pub filename: String,
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    pub media_kind: MediaKind,
    /// Timestamp of the most recent content write (creation or replace).
    pub uploaded_at: DateTime<Utc>,
    #[schema(example = "hero")]
    pub category: String,
    #[schema(example = "hero-home")]
    pub section: Option<String>,
    #[schema(example = "ocean-sunrise")]
    pub slug: Option<String>,
    /// Sort key within a section. Not contiguous, not unique; ties break by
    /// `uploaded_at` ascending.
    pub order: i64,
    /// For videos, an optional image asset used as a poster frame.
    pub poster_asset_id: Option<Uuid>,
    /// Marks assets created by provisioning rather than admin upload.
    pub seeded: bool,
}

impl Asset {
    /// Public URL under which this asset's content is served.
    pub fn content_url(&self) -> String {
        format!("/assets/content/{}", self.id)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchOrderRequest {
    #[schema(example = 300)]
    pub order: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReorderRequest {
    /// Asset ids in the desired display order.
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSectionQuery {
    /// Restrict the listing to one media kind.
    pub kind: Option<MediaKind>,
}

/// Shape of the multipart body accepted by the upload endpoint, for the
/// OpenAPI document only.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadAssetRequest {
    #[allow(unused)]
    pub file: Vec<u8>,
    #[allow(unused)]
    pub category: String,
    #[allow(unused)]
    pub section: Option<String>,
    #[allow(unused)]
    pub slug: Option<String>,
    #[allow(unused)]
    pub order: Option<i64>,
    #[allow(unused)]
    pub content_type: Option<String>,
    #[allow(unused)]
    pub poster_asset_id: Option<Uuid>,
}

/// Shape of the multipart body accepted by the replace endpoint, for the
/// OpenAPI document only.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceAssetRequest {
    #[allow(unused)]
    pub file: Vec<u8>,
    #[allow(unused)]
    pub content_type: Option<String>,
}
