//! Style profile - a derived summary of one user's writing voice

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::value_objects::{StyleMetrics, StyleVoice, MIN_CONFIDENCE_FOR_GENERATION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    pub user_id: UserId,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub metrics: StyleMetrics,
    pub voice: StyleVoice,
    pub stories_analyzed: u32,
    pub words_analyzed: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StyleProfile {
    pub fn usable_for_generation(&self) -> bool {
        self.confidence >= MIN_CONFIDENCE_FOR_GENERATION
    }

    /// Render the profile as prompt guidance.
    pub fn as_prompt_guidance(&self) -> String {
        let mut lines = vec![
            format!("Tone: {}", self.voice.tone),
            format!("Pacing: {}", self.voice.pacing),
            format!(
                "Average sentence length: {:.1} words (variance {:.1})",
                self.metrics.avg_sentence_length, self.metrics.sentence_length_variance
            ),
            format!(
                "Average paragraph length: {:.1} words",
                self.metrics.avg_paragraph_length
            ),
            format!(
                "Dialogue share of paragraphs: {:.0}%",
                self.metrics.dialogue_ratio * 100.0
            ),
            format!(
                "Vocabulary richness: {:.2}",
                self.metrics.vocabulary_richness
            ),
        ];
        if !self.voice.themes.is_empty() {
            lines.push(format!("Recurring themes: {}", self.voice.themes.join(", ")));
        }
        if !self.voice.description.is_empty() {
            lines.push(format!("Voice: {}", self.voice.description));
        }
        lines.join("\n")
    }
}
