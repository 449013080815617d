//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkworld_domain::*;

use super::error::RepoError;

// =============================================================================
// Sessions
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn get_session(&self, token: &str) -> Result<Option<Session>, RepoError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError>;
}

// =============================================================================
// Stories
// =============================================================================

/// Published-story listing criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFilter {
    pub kind: StoryKind,
    /// Case-insensitive match against title or content
    pub search: Option<String>,
    pub offset: u32,
    pub limit: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepo: Send + Sync {
    async fn get(&self, id: StoryId) -> Result<Option<Story>, RepoError>;
    /// Insert or update.
    async fn save(&self, story: &Story) -> Result<(), RepoError>;
    /// Cascades to nodes, choices and character links.
    async fn delete(&self, id: StoryId) -> Result<(), RepoError>;
    /// Newest `updated_at` first.
    async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Story>, RepoError>;
    /// One page of published stories plus the total match count.
    async fn list_published(
        &self,
        filter: &LibraryFilter,
    ) -> Result<(Vec<LibraryEntry>, u32), RepoError>;
}

// =============================================================================
// Story graph
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRepo: Send + Sync {
    async fn get(&self, id: NodeId) -> Result<Option<StoryNode>, RepoError>;
    async fn save(&self, node: &StoryNode) -> Result<(), RepoError>;
    /// Ordered by position.
    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<StoryNode>, RepoError>;
    async fn count_for_story(&self, story_id: StoryId) -> Result<u32, RepoError>;
    /// Unset `is_start` on every node of the story.
    async fn clear_start(&self, story_id: StoryId, now: DateTime<Utc>) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChoiceRepo: Send + Sync {
    async fn get(&self, id: ChoiceId) -> Result<Option<Choice>, RepoError>;
    async fn save(&self, choice: &Choice) -> Result<(), RepoError>;
    async fn delete(&self, id: ChoiceId) -> Result<(), RepoError>;
    /// Every choice leaving a node of the story, ordered by position.
    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Choice>, RepoError>;
    async fn exists_between(&self, from: NodeId, to: NodeId) -> Result<bool, RepoError>;
    /// Returns false when no row was touched.
    async fn increment_times_chosen(&self, id: ChoiceId) -> Result<bool, RepoError>;
}

// =============================================================================
// Characters
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    /// Newest first.
    async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Character>, RepoError>;
    async fn link_story(&self, id: CharacterId, story_id: StoryId) -> Result<(), RepoError>;
    /// The author's intervention-enabled characters linked to the story,
    /// oldest first.
    async fn list_live_for_story(
        &self,
        author_id: UserId,
        story_id: StoryId,
    ) -> Result<Vec<Character>, RepoError>;
    async fn record_intervention(
        &self,
        id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Style profiles
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StyleProfileRepo: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<StyleProfile>, RepoError>;
    /// Replaces any existing profile for the user.
    async fn save(&self, profile: &StyleProfile) -> Result<(), RepoError>;
    /// Returns false when there was no profile.
    async fn delete(&self, user_id: UserId) -> Result<bool, RepoError>;
}
