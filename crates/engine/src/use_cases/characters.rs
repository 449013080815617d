//! Character use cases.

use std::sync::Arc;

use inkworld_domain::{Character, StoryId, UserId};
use inkworld_shared::CreateCharacterRequest;

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RepoError};
use crate::use_cases::authorization::{AccessError, StoryAccess};

#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("Story not found")]
    StoryNotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<AccessError> for CharacterError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => CharacterError::StoryNotFound,
            AccessError::Repo(e) => CharacterError::Repo(e),
        }
    }
}

pub struct CharacterOps {
    characters: Arc<dyn CharacterRepo>,
    access: Arc<StoryAccess>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterOps {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        access: Arc<StoryAccess>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            characters,
            access,
            clock,
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<Character>, CharacterError> {
        Ok(self.characters.list_by_author(user_id).await?)
    }

    /// Create a character and link it to the listed stories the user owns.
    pub async fn create(
        &self,
        user_id: UserId,
        data: CreateCharacterRequest,
    ) -> Result<Character, CharacterError> {
        let character = Character::new(user_id, data.name.trim(), self.clock.now())
            .with_backstory(data.backstory)
            .with_traits(data.traits)
            .with_personality(data.personality)
            .with_voice(data.voice_tone, data.emotional_range)
            .with_triggers(data.trigger_topics, data.trigger_words)
            .with_intervention(
                data.intervention_enabled,
                data.intervention_style,
                data.intervention_frequency,
            );
        self.characters.save(&character).await?;

        for raw_id in &data.story_ids {
            let Ok(story_id) = raw_id.parse::<StoryId>() else {
                tracing::warn!(story_id = %raw_id, "Skipping malformed story id for character link");
                continue;
            };
            match self.access.owned_story(user_id, story_id).await {
                Ok(story) => self.characters.link_story(character.id, story.id).await?,
                Err(AccessError::NotFound) => {
                    tracing::warn!(
                        story_id = %story_id,
                        character_id = %character.id,
                        "Skipping character link to a story the user does not own"
                    );
                }
                Err(AccessError::Repo(e)) => return Err(e.into()),
            }
        }

        tracing::info!(character_id = %character.id, user_id = %user_id, "Created character");
        Ok(character)
    }

    /// Intervention-enabled characters linked to one of the user's stories.
    pub async fn live_characters(
        &self,
        user_id: UserId,
        story_id: StoryId,
    ) -> Result<Vec<Character>, CharacterError> {
        let story = self.access.owned_story(user_id, story_id).await?;
        Ok(self
            .characters
            .list_live_for_story(user_id, story.id)
            .await?)
    }
}
