use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2048, message = "Cover image URL is too long"))]
    pub cover_image_url: Option<String>,
}

/// Editor save. Absent fields are left untouched; an empty
/// `coverImageUrl` clears the cover.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoryRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    #[validate(length(max = 2048, message = "Cover image URL is too long"))]
    pub cover_image_url: Option<String>,
}

/// `GET /api/library` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}
