//! Character intervention vocabulary.
//!
//! An intervention is an in-character line a writer's own character drops
//! into the editor when the text touches one of its triggers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, InterventionId};

/// How a character phrases its interjections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionStyle {
    #[default]
    Subtle,
    Direct,
    Playful,
    Dramatic,
}

impl InterventionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStyle::Subtle => "SUBTLE",
            InterventionStyle::Direct => "DIRECT",
            InterventionStyle::Playful => "PLAYFUL",
            InterventionStyle::Dramatic => "DRAMATIC",
        }
    }

    /// Prompt guidance for this style.
    pub fn guidance(&self) -> &'static str {
        match self {
            InterventionStyle::Subtle => "a quiet aside, a hint rather than a statement",
            InterventionStyle::Direct => "a frank, plain-spoken reaction",
            InterventionStyle::Playful => "a teasing, light-hearted remark",
            InterventionStyle::Dramatic => "a heightened, theatrical outburst",
        }
    }
}

impl std::str::FromStr for InterventionStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUBTLE" => Ok(Self::Subtle),
            "DIRECT" => Ok(Self::Direct),
            "PLAYFUL" => Ok(Self::Playful),
            "DRAMATIC" => Ok(Self::Dramatic),
            _ => Err(DomainError::parse(format!("Unknown intervention style: {}", s))),
        }
    }
}

/// How often a character is allowed to speak up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionFrequency {
    Rare,
    #[default]
    Occasional,
    Frequent,
}

impl InterventionFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionFrequency::Rare => "RARE",
            InterventionFrequency::Occasional => "OCCASIONAL",
            InterventionFrequency::Frequent => "FREQUENT",
        }
    }

    /// Percent chance a triggered character actually speaks.
    pub fn chance_percent(&self) -> i32 {
        match self {
            InterventionFrequency::Rare => 20,
            InterventionFrequency::Occasional => 50,
            InterventionFrequency::Frequent => 85,
        }
    }

    /// Minimum quiet time after the previous intervention.
    pub fn cooldown(&self) -> Duration {
        match self {
            InterventionFrequency::Rare => Duration::minutes(10),
            InterventionFrequency::Occasional => Duration::minutes(3),
            InterventionFrequency::Frequent => Duration::minutes(1),
        }
    }

    pub fn cooled_down(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            Some(last) => now - last >= self.cooldown(),
            None => true,
        }
    }

    /// A roll in `1..=100` succeeds when it does not exceed the chance.
    pub fn roll_succeeds(&self, roll: i32) -> bool {
        roll <= self.chance_percent()
    }
}

impl std::str::FromStr for InterventionFrequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RARE" => Ok(Self::Rare),
            "OCCASIONAL" => Ok(Self::Occasional),
            "FREQUENT" => Ok(Self::Frequent),
            _ => Err(DomainError::parse(format!(
                "Unknown intervention frequency: {}",
                s
            ))),
        }
    }
}

/// The in-character line the editor displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InterventionId>,
    pub character_id: CharacterId,
    pub character_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub style: InterventionStyle,
    pub triggered_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Intervention {
    /// Stamp identity and time onto a decided intervention.
    pub fn stamped(mut self, id: InterventionId, now: DateTime<Utc>) -> Self {
        self.id = Some(id);
        self.timestamp = Some(now);
        self
    }
}

/// Outcome of evaluating a story's characters against the writer's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionDecision {
    pub should_intervene: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention: Option<Intervention>,
}

impl InterventionDecision {
    pub fn none() -> Self {
        Self {
            should_intervene: false,
            intervention: None,
        }
    }

    pub fn intervene(intervention: Intervention) -> Self {
        Self {
            should_intervene: true,
            intervention: Some(intervention),
        }
    }
}

/// Return the triggers that occur in `text`.
///
/// Words match whole words, case-insensitively; a multi-word entry must
/// appear as consecutive words. Topics match as case-insensitive
/// substrings.
pub fn matched_triggers(words: &[String], topics: &[String], text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    let tokens = word_tokens(&haystack);

    let mut matched = Vec::new();
    for word in words {
        let needle = word.to_lowercase();
        let phrase = word_tokens(&needle);
        if !phrase.is_empty()
            && tokens
                .windows(phrase.len())
                .any(|run| run == phrase.as_slice())
        {
            matched.push(word.clone());
        }
    }
    for topic in topics {
        let needle = topic.trim().to_lowercase();
        if !needle.is_empty() && haystack.contains(&needle) {
            matched.push(topic.clone());
        }
    }
    matched
}

fn word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
        .filter(|t| !t.is_empty())
        .collect()
}
