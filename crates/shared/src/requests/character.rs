use serde::{Deserialize, Serialize};
use validator::Validate;

use inkworld_domain::{InterventionFrequency, InterventionStyle, Personality};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Backstory must be at most 5000 characters"))]
    pub backstory: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 traits are allowed"))]
    pub traits: Vec<String>,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    #[validate(length(max = 200, message = "Voice tone must be at most 200 characters"))]
    pub voice_tone: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Emotional range must be at most 200 characters"))]
    pub emotional_range: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 trigger topics are allowed"))]
    pub trigger_topics: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 trigger words are allowed"))]
    pub trigger_words: Vec<String>,
    #[serde(default)]
    pub intervention_enabled: bool,
    #[serde(default)]
    pub intervention_style: InterventionStyle,
    #[serde(default)]
    pub intervention_frequency: InterventionFrequency,
    /// Stories to link the character to; ids the caller does not own are skipped.
    #[serde(default)]
    pub story_ids: Vec<String>,
}
