//! Ownership checks shared by every story-scoped use case.
//!
//! Absent and not-yours are reported identically so callers cannot probe
//! for other users' stories.

use std::sync::Arc;

use inkworld_domain::{Choice, ChoiceId, Story, StoryId, StoryNode, UserId};

use crate::infrastructure::ports::{ChoiceRepo, NodeRepo, RepoError, StoryRepo};

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// A choice whose ownership has been verified through its story.
#[derive(Debug, Clone)]
pub struct OwnedChoice {
    pub story: Story,
    pub choice: Choice,
    pub from_node: StoryNode,
}

pub struct StoryAccess {
    stories: Arc<dyn StoryRepo>,
    nodes: Arc<dyn NodeRepo>,
    choices: Arc<dyn ChoiceRepo>,
}

impl StoryAccess {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        nodes: Arc<dyn NodeRepo>,
        choices: Arc<dyn ChoiceRepo>,
    ) -> Self {
        Self {
            stories,
            nodes,
            choices,
        }
    }

    /// The story, if `user_id` wrote it.
    pub async fn owned_story(
        &self,
        user_id: UserId,
        story_id: StoryId,
    ) -> Result<Story, AccessError> {
        self.stories
            .get(story_id)
            .await?
            .filter(|story| story.is_owned_by(user_id))
            .ok_or(AccessError::NotFound)
    }

    /// The story, if it is published or `viewer` wrote it.
    pub async fn readable_story(
        &self,
        viewer: Option<UserId>,
        story_id: StoryId,
    ) -> Result<Story, AccessError> {
        self.stories
            .get(story_id)
            .await?
            .filter(|story| story.is_readable_by(viewer))
            .ok_or(AccessError::NotFound)
    }

    /// The choice, if its source node sits in a story `user_id` owns and
    /// that story is `story_id`.
    pub async fn owned_choice(
        &self,
        user_id: UserId,
        story_id: StoryId,
        choice_id: ChoiceId,
    ) -> Result<OwnedChoice, AccessError> {
        let story = self.owned_story(user_id, story_id).await?;
        let choice = self
            .choices
            .get(choice_id)
            .await?
            .ok_or(AccessError::NotFound)?;
        let from_node = self
            .nodes
            .get(choice.from_node_id)
            .await?
            .filter(|node| node.belongs_to(story_id))
            .ok_or(AccessError::NotFound)?;

        Ok(OwnedChoice {
            story,
            choice,
            from_node,
        })
    }
}
