//! Writing-style measurements and the eligibility rules around them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::text::{paragraphs, split_sentences, strip_markup};

/// Stories required before a profile may be computed.
pub const MIN_STORIES_FOR_ANALYSIS: u32 = 2;
/// Words (across all stories) required before a profile may be computed.
pub const MIN_WORDS_FOR_ANALYSIS: u32 = 3000;
/// Profiles below this confidence are not used for generation.
pub const MIN_CONFIDENCE_FOR_GENERATION: f32 = 0.5;

/// Whether a user's corpus is large enough to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleEligibility {
    pub eligible: bool,
    pub story_count: u32,
    pub word_count: u32,
    pub required_stories: u32,
    pub required_words: u32,
}

impl StyleEligibility {
    pub fn evaluate(story_count: u32, word_count: u32) -> Self {
        Self {
            eligible: story_count >= MIN_STORIES_FOR_ANALYSIS
                && word_count >= MIN_WORDS_FOR_ANALYSIS,
            story_count,
            word_count,
            required_stories: MIN_STORIES_FOR_ANALYSIS,
            required_words: MIN_WORDS_FOR_ANALYSIS,
        }
    }

    /// Human-readable explanation of what is missing.
    pub fn shortfall(&self) -> Option<String> {
        if self.eligible {
            return None;
        }
        Some(format!(
            "Style analysis needs at least {} stories and {} words (you have {} stories and {} words)",
            self.required_stories, self.required_words, self.story_count, self.word_count
        ))
    }
}

/// Confidence grows with corpus size and saturates at 1.0.
pub fn profile_confidence(story_count: u32, word_count: u32) -> f32 {
    let raw = 0.3 + 0.1 * story_count as f32 + word_count as f32 / 20_000.0;
    (raw.min(1.0) * 100.0).round() / 100.0
}

/// Statistical signals computed locally from a user's stories.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMetrics {
    /// Words per sentence
    pub avg_sentence_length: f32,
    /// Words per paragraph
    pub avg_paragraph_length: f32,
    /// Distinct words / total words
    pub vocabulary_richness: f32,
    /// Share of paragraphs containing quoted speech
    pub dialogue_ratio: f32,
    pub sentence_length_variance: f32,
}

impl StyleMetrics {
    /// Measure a corpus of rich-text documents.
    pub fn measure<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut sentence_lengths: Vec<usize> = Vec::new();
        let mut paragraph_lengths: Vec<usize> = Vec::new();
        let mut dialogue_paragraphs = 0usize;
        let mut vocabulary: HashSet<String> = HashSet::new();
        let mut total_words = 0usize;

        for doc in documents {
            let doc = doc.as_ref();
            for paragraph in paragraphs(doc) {
                paragraph_lengths.push(paragraph.split_whitespace().count());
                if paragraph.contains('"') || paragraph.contains('“') {
                    dialogue_paragraphs += 1;
                }
            }

            let plain = strip_markup(doc);
            for sentence in split_sentences(&plain) {
                sentence_lengths.push(sentence.split_whitespace().count());
            }
            for word in plain.split_whitespace() {
                let normalized: String = word
                    .chars()
                    .filter(|c| c.is_alphanumeric() || *c == '\'')
                    .collect::<String>()
                    .to_lowercase();
                if !normalized.is_empty() {
                    total_words += 1;
                    vocabulary.insert(normalized);
                }
            }
        }

        let avg_sentence_length = mean(&sentence_lengths);
        Self {
            avg_sentence_length: round2(avg_sentence_length),
            avg_paragraph_length: round2(mean(&paragraph_lengths)),
            vocabulary_richness: round2(ratio(vocabulary.len(), total_words)),
            dialogue_ratio: round2(ratio(dialogue_paragraphs, paragraph_lengths.len())),
            sentence_length_variance: round2(variance(&sentence_lengths, avg_sentence_length)),
        }
    }
}

/// Qualitative voice summary produced by the language model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVoice {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub pacing: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn mean(values: &[usize]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f32 / values.len() as f32
}

fn variance(values: &[usize], mean: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values
        .iter()
        .map(|v| (*v as f32 - mean).powi(2))
        .sum::<f32>()
        / values.len() as f32
}

fn ratio(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
