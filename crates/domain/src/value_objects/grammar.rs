//! Grammar and style review types.

use serde::{Deserialize, Serialize};

/// Suggestions below this confidence are dropped unless the caller overrides it.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Aspect of the text a review should focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarFocus {
    Grammar,
    Spelling,
    Punctuation,
    Style,
    Clarity,
}

impl GrammarFocus {
    pub const ALL: [GrammarFocus; 5] = [
        GrammarFocus::Grammar,
        GrammarFocus::Spelling,
        GrammarFocus::Punctuation,
        GrammarFocus::Style,
        GrammarFocus::Clarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarFocus::Grammar => "grammar",
            GrammarFocus::Spelling => "spelling",
            GrammarFocus::Punctuation => "punctuation",
            GrammarFocus::Style => "style",
            GrammarFocus::Clarity => "clarity",
        }
    }
}

/// Character span of the flagged text within the submitted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: u32,
    pub end: u32,
}

/// One proposed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarSuggestion {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub original: String,
    pub suggestion: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<TextSpan>,
}

fn default_kind() -> String {
    GrammarFocus::Grammar.as_str().to_string()
}

/// Full review as returned to the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarReport {
    #[serde(default)]
    pub suggestions: Vec<GrammarSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl GrammarReport {
    /// Keep only suggestions at or above `threshold`.
    pub fn retain_confident(mut self, threshold: f32) -> Self {
        self.suggestions.retain(|s| s.confidence >= threshold);
        self
    }
}
