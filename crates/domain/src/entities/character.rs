//! Character entity - a writer's recurring character
//!
//! Characters belong to their author and may be linked to any number of that
//! author's stories. Intervention-enabled characters can speak up while the
//! author writes one of those stories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, UserId};
use crate::value_objects::{matched_triggers, InterventionFrequency, InterventionStyle};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emotional_tendencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub author_id: UserId,
    pub name: String,
    pub backstory: String,
    pub traits: Vec<String>,
    pub personality: Personality,
    pub voice_tone: String,
    pub emotional_range: String,
    pub trigger_topics: Vec<String>,
    pub trigger_words: Vec<String>,
    pub intervention_enabled: bool,
    pub intervention_style: InterventionStyle,
    pub intervention_frequency: InterventionFrequency,
    pub total_interventions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_intervention: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(author_id: UserId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CharacterId::new(),
            author_id,
            name: name.into(),
            backstory: String::new(),
            traits: Vec::new(),
            personality: Personality::default(),
            voice_tone: String::new(),
            emotional_range: String::new(),
            trigger_topics: Vec::new(),
            trigger_words: Vec::new(),
            intervention_enabled: false,
            intervention_style: InterventionStyle::default(),
            intervention_frequency: InterventionFrequency::default(),
            total_interventions: 0,
            last_intervention: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn with_traits(mut self, traits: Vec<String>) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_voice(mut self, voice_tone: impl Into<String>, emotional_range: impl Into<String>) -> Self {
        self.voice_tone = voice_tone.into();
        self.emotional_range = emotional_range.into();
        self
    }

    pub fn with_triggers(mut self, topics: Vec<String>, words: Vec<String>) -> Self {
        self.trigger_topics = topics;
        self.trigger_words = words;
        self
    }

    pub fn with_intervention(
        mut self,
        enabled: bool,
        style: InterventionStyle,
        frequency: InterventionFrequency,
    ) -> Self {
        self.intervention_enabled = enabled;
        self.intervention_style = style;
        self.intervention_frequency = frequency;
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Triggers of this character that occur in `text`.
    pub fn triggers_in(&self, text: &str) -> Vec<String> {
        matched_triggers(&self.trigger_words, &self.trigger_topics, text)
    }

    pub fn record_intervention(&mut self, now: DateTime<Utc>) {
        self.total_interventions += 1;
        self.last_intervention = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn records_interventions() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut character = Character::new(UserId::new(), "Mara", now).with_triggers(
            vec!["the war".into()],
            vec!["dragon".into()],
        );

        assert_eq!(
            character.triggers_in("A dragon remembered the war."),
            vec!["dragon".to_string(), "the war".to_string()]
        );

        character.record_intervention(now);
        assert_eq!(character.total_interventions, 1);
        assert_eq!(character.last_intervention, Some(now));
    }

    #[test]
    fn serializes_camel_case_without_empty_personality_fields() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let character = Character::new(UserId::new(), "Mara", now);
        let json = serde_json::to_value(&character).expect("serialize");
        assert_eq!(json["interventionStyle"], "SUBTLE");
        assert_eq!(json["interventionFrequency"], "OCCASIONAL");
        assert!(json["personality"].as_object().is_some_and(|o| o.is_empty()));
    }
}
