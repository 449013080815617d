//! Story entity - the top-level authored work
//!
//! A story is either linear (its text lives in `content`) or interactive
//! (its text lives in a graph of [`StoryNode`](super::StoryNode)s joined by
//! [`Choice`](super::Choice) edges). Conversion is one-way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{StoryId, UserId};
use crate::value_objects::word_count;

/// Title given to stories created without one.
pub const UNTITLED_STORY: &str = "Untitled Story";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    /// Rich text (editor HTML)
    pub content: String,
    pub word_count: u32,
    pub published: bool,
    pub views: u32,
    pub likes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub is_interactive: bool,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    pub fn new(author_id: UserId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            id: StoryId::new(),
            title: if title.trim().is_empty() {
                UNTITLED_STORY.to_string()
            } else {
                title
            },
            content: String::new(),
            word_count: 0,
            published: false,
            views: 0,
            likes: 0,
            cover_image_url: None,
            is_interactive: false,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.word_count = word_count(&self.content);
        self
    }

    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(url.into());
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Anyone may read a published story; drafts only by their author.
    pub fn is_readable_by(&self, viewer: Option<UserId>) -> bool {
        self.published || viewer.is_some_and(|id| self.is_owned_by(id))
    }

    pub fn rename(&mut self, title: impl Into<String>, now: DateTime<Utc>) {
        self.title = title.into();
        self.updated_at = now;
    }

    /// Replace the content and recompute the word count.
    pub fn update_content(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        self.content = content.into();
        self.word_count = word_count(&self.content);
        self.updated_at = now;
    }

    pub fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        self.published = published;
        self.updated_at = now;
    }

    pub fn set_cover_image(&mut self, url: Option<String>, now: DateTime<Utc>) {
        self.cover_image_url = url;
        self.updated_at = now;
    }

    pub fn mark_interactive(&mut self, now: DateTime<Utc>) {
        self.is_interactive = true;
        self.updated_at = now;
    }
}

/// A story as listed in the public library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    #[serde(flatten)]
    pub story: Story,
    pub author_name: String,
}

/// Which kind of stories a library listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    #[default]
    All,
    Interactive,
    Linear,
}

impl std::str::FromStr for StoryKind {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "interactive" => Ok(Self::Interactive),
            "linear" | "standard" => Ok(Self::Linear),
            _ => Err(crate::error::DomainError::parse(format!(
                "Unknown story type: {}",
                s
            ))),
        }
    }
}
