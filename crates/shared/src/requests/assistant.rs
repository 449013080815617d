use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "threadId is required"))]
    pub thread_id: String,
    #[validate(length(min = 1, max = 10000, message = "Message must be 1-10000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrammarRequest {
    #[validate(length(min = 1, max = 20000, message = "Text must be 1-20000 characters"))]
    pub text: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Context must be at most 2000 characters"))]
    pub context: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Style must be at most 200 characters"))]
    pub style: Option<String>,
    /// Focus names; unknown names are rejected by the engine.
    #[serde(default)]
    pub focus: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0, message = "confidenceThreshold must be between 0 and 1"))]
    pub confidence_threshold: Option<f32>,
}

/// `speed` is clamped rather than rejected, so it carries no range rule.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InterventionRequest {
    #[validate(length(min = 1, message = "storyId is required"))]
    pub story_id: String,
    #[serde(default)]
    pub current_text: String,
    #[serde(default)]
    pub recent_text: String,
}
