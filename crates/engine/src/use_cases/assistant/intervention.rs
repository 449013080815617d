//! Character interventions while the author writes.

use std::sync::Arc;

use serde::Deserialize;

use inkworld_domain::{
    Character, Intervention, InterventionDecision, InterventionId, StoryId, UserId,
};
use inkworld_shared::InterventionRequest;

use crate::infrastructure::ports::{
    CharacterRepo, ChatMessage, ClockPort, LlmPort, LlmRequest, RandomPort,
};
use crate::use_cases::authorization::{AccessError, StoryAccess};
use crate::use_cases::json_reply::parse_json_reply;

use super::AiError;

const EXCERPT_CHARS: usize = 1500;

#[derive(Debug, Deserialize)]
struct CharacterLine {
    message: String,
    #[serde(default)]
    mood: Option<String>,
}

pub struct InterventionOps {
    characters: Arc<dyn CharacterRepo>,
    access: Arc<StoryAccess>,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl InterventionOps {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        access: Arc<StoryAccess>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            characters,
            access,
            llm,
            clock,
            random,
        }
    }

    /// Decide whether one of the story's live characters speaks up.
    ///
    /// Characters are tried in link order; the first that is triggered, off
    /// cool-down and wins its frequency roll gets the line.
    pub async fn evaluate(
        &self,
        user_id: UserId,
        data: InterventionRequest,
    ) -> Result<InterventionDecision, AiError> {
        let story_id: StoryId = data.story_id.parse().map_err(|_| AiError::StoryNotFound)?;
        let story = self
            .access
            .owned_story(user_id, story_id)
            .await
            .map_err(|e| match e {
                AccessError::NotFound => AiError::StoryNotFound,
                AccessError::Repo(e) => AiError::Repo(e),
            })?;

        let window = if data.recent_text.trim().is_empty() {
            data.current_text.as_str()
        } else {
            data.recent_text.as_str()
        };
        let now = self.clock.now();

        for character in self.characters.list_live_for_story(user_id, story.id).await? {
            let triggers = character.triggers_in(window);
            if triggers.is_empty() {
                continue;
            }
            let frequency = character.intervention_frequency;
            if !frequency.cooled_down(character.last_intervention, now) {
                tracing::debug!(character_id = %character.id, "Character still cooling down");
                continue;
            }
            let roll = self.random.gen_range(1, 100);
            if !frequency.roll_succeeds(roll) {
                tracing::debug!(character_id = %character.id, roll, "Intervention roll missed");
                continue;
            }

            let line = self.speak(&character, &triggers, &data.current_text).await?;
            self.characters
                .record_intervention(character.id, now)
                .await?;

            let intervention = Intervention {
                id: None,
                character_id: character.id,
                character_name: character.name,
                message: line.message,
                mood: line.mood.filter(|m| !m.trim().is_empty()),
                style: character.intervention_style,
                triggered_by: triggers,
                timestamp: None,
            }
            .stamped(InterventionId::from_uuid(self.random.gen_uuid()), now);

            tracing::info!(
                story_id = %story.id,
                character_id = %intervention.character_id,
                "Character intervened"
            );
            return Ok(InterventionDecision::intervene(intervention));
        }

        Ok(InterventionDecision::none())
    }

    async fn speak(
        &self,
        character: &Character,
        triggers: &[String],
        current_text: &str,
    ) -> Result<CharacterLine, AiError> {
        let request = LlmRequest::new(vec![ChatMessage::user(build_prompt(
            character,
            triggers,
            current_text,
        ))])
        .with_system_prompt(format!(
            "You are {}, a character in the author's story. Stay in character. \
             Reply with JSON only: {{\"message\": \"...\", \"mood\": \"...\"}}.",
            character.name
        ))
        .with_temperature(0.9)
        .with_max_tokens(Some(200))
        .expecting_json();

        let response = self.llm.generate(request).await?;
        let line: CharacterLine = parse_json_reply(&response.content)
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        if line.message.trim().is_empty() {
            return Err(AiError::InvalidResponse("empty intervention message".into()));
        }
        Ok(line)
    }
}

fn build_prompt(character: &Character, triggers: &[String], current_text: &str) -> String {
    let mut prompt = String::new();
    if !character.backstory.is_empty() {
        prompt.push_str(&format!("Backstory: {}\n", character.backstory));
    }
    if !character.traits.is_empty() {
        prompt.push_str(&format!("Traits: {}\n", character.traits.join(", ")));
    }
    let personality = &character.personality;
    for (label, value) in [
        ("Temperament", &personality.temperament),
        ("Speaking style", &personality.speaking_style),
        ("Humor", &personality.humor),
        ("Confidence", &personality.confidence),
    ] {
        if let Some(value) = value {
            prompt.push_str(&format!("{}: {}\n", label, value));
        }
    }
    if !character.voice_tone.is_empty() {
        prompt.push_str(&format!("Voice: {}\n", character.voice_tone));
    }
    prompt.push_str(&format!(
        "\nThe author just wrote about: {}.\n\
         Interject with {} in one or two sentences.\n\nWhat they are writing:\n{}",
        triggers.join(", "),
        character.intervention_style.guidance(),
        excerpt(current_text)
    ));
    prompt
}

/// The tail of the text, where the author is working.
fn excerpt(text: &str) -> &str {
    let total = text.chars().count();
    if total <= EXCERPT_CHARS {
        return text;
    }
    let skip = total - EXCERPT_CHARS;
    let start = text.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(0);
    &text[start..]
}
