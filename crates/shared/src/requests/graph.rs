use serde::{Deserialize, Serialize};
use validator::Validate;

use inkworld_domain::NodeType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub is_start: bool,
    #[serde(default)]
    pub is_ending: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChoiceRequest {
    #[validate(length(min = 1, message = "fromNodeId is required"))]
    pub from_node_id: String,
    #[validate(length(min = 1, message = "toNodeId is required"))]
    pub to_node_id: String,
    #[validate(length(min = 1, max = 200, message = "Choice text must be 1-200 characters"))]
    pub text: String,
    #[serde(default)]
    #[validate(length(max = 16, message = "Emoji is too long"))]
    pub emoji: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChoiceRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Choice text must be 1-200 characters"))]
    pub text: Option<String>,
    #[serde(default)]
    #[validate(length(max = 16, message = "Emoji is too long"))]
    pub emoji: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
    #[serde(default)]
    #[validate(length(min = 1, message = "toNodeId must not be empty"))]
    pub to_node_id: Option<String>,
}
