use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStyleRequest {
    #[validate(length(min = 1, max = 2000, message = "Prompt must be 1-2000 characters"))]
    pub prompt: String,
    /// Target length in words.
    #[serde(default)]
    #[validate(range(min = 50, max = 2000, message = "Length must be between 50 and 2000 words"))]
    pub length: Option<u32>,
}
