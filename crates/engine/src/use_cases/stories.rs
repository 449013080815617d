//! Linear story use cases and the public library.

use std::sync::Arc;

use inkworld_domain::{Story, StoryId, StoryKind, UserId};
use inkworld_shared::{CreateStoryRequest, LibraryPage, LibraryQuery, Pagination, UpdateStoryRequest};

use crate::infrastructure::ports::{ClockPort, LibraryFilter, RepoError, StoryRepo};
use crate::use_cases::authorization::{AccessError, StoryAccess};

pub const DEFAULT_LIBRARY_LIMIT: u32 = 12;
pub const MAX_LIBRARY_LIMIT: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Story not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<AccessError> for StoryError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => StoryError::NotFound,
            AccessError::Repo(e) => StoryError::Repo(e),
        }
    }
}

pub struct StoryOps {
    stories: Arc<dyn StoryRepo>,
    access: Arc<StoryAccess>,
    clock: Arc<dyn ClockPort>,
}

impl StoryOps {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        access: Arc<StoryAccess>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            access,
            clock,
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<Story>, StoryError> {
        Ok(self.stories.list_by_author(user_id).await?)
    }

    pub async fn create(
        &self,
        user_id: UserId,
        data: CreateStoryRequest,
    ) -> Result<Story, StoryError> {
        let now = self.clock.now();
        let mut story = Story::new(user_id, data.title.unwrap_or_default(), now);
        if let Some(content) = data.content {
            story = story.with_content(content);
        }
        if let Some(url) = data.cover_image_url.filter(|u| !u.trim().is_empty()) {
            story = story.with_cover_image(url);
        }

        self.stories.save(&story).await?;
        tracing::info!(story_id = %story.id, user_id = %user_id, "Created story");
        Ok(story)
    }

    pub async fn get(&self, user_id: UserId, story_id: StoryId) -> Result<Story, StoryError> {
        Ok(self.access.owned_story(user_id, story_id).await?)
    }

    /// Apply whichever fields are present. An empty cover URL clears it.
    pub async fn update(
        &self,
        user_id: UserId,
        story_id: StoryId,
        data: UpdateStoryRequest,
    ) -> Result<Story, StoryError> {
        let mut story = self.access.owned_story(user_id, story_id).await?;
        let now = self.clock.now();

        if let Some(title) = data.title {
            story.rename(title, now);
        }
        if let Some(content) = data.content {
            story.update_content(content, now);
        }
        if let Some(published) = data.published {
            story.set_published(published, now);
        }
        if let Some(url) = data.cover_image_url {
            let url = Some(url).filter(|u| !u.trim().is_empty());
            story.set_cover_image(url, now);
        }

        self.stories.save(&story).await?;
        Ok(story)
    }

    pub async fn delete(&self, user_id: UserId, story_id: StoryId) -> Result<(), StoryError> {
        let story = self.access.owned_story(user_id, story_id).await?;
        self.stories.delete(story.id).await?;
        tracing::info!(story_id = %story.id, "Deleted story");
        Ok(())
    }

    /// One page of published stories. Unknown `type` values list everything.
    pub async fn library(&self, query: LibraryQuery) -> Result<LibraryPage, StoryError> {
        let page = query.page.filter(|p| *p > 0).unwrap_or(1);
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIBRARY_LIMIT)
            .min(MAX_LIBRARY_LIMIT);
        let kind = query
            .kind
            .as_deref()
            .and_then(|k| k.parse::<StoryKind>().ok())
            .unwrap_or_default();

        let filter = LibraryFilter {
            kind,
            search: query.search.filter(|s| !s.trim().is_empty()),
            offset: (page - 1).saturating_mul(limit),
            limit,
        };
        let (stories, total) = self.stories.list_published(&filter).await?;

        Ok(LibraryPage {
            stories,
            pagination: Pagination::new(page, limit, total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockChoiceRepo, MockNodeRepo, MockStoryRepo};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    /// Same mock behind both the ops and the access check.
    fn ops(stories: MockStoryRepo) -> StoryOps {
        let stories: Arc<dyn StoryRepo> = Arc::new(stories);
        let access = StoryAccess::new(
            stories.clone(),
            Arc::new(MockNodeRepo::new()),
            Arc::new(MockChoiceRepo::new()),
        );
        StoryOps::new(stories, Arc::new(access), Arc::new(FixedClock(now())))
    }

    #[tokio::test]
    async fn create_defaults_title_and_counts_words() {
        let mut stories = MockStoryRepo::new();
        stories
            .expect_save()
            .withf(|s| s.title == "Untitled Story" && s.word_count == 3)
            .times(1)
            .returning(|_| Ok(()));

        let story = ops(stories)
            .create(
                UserId::new(),
                CreateStoryRequest {
                    title: Some("  ".into()),
                    content: Some("<p>It was dark</p>".into()),
                    cover_image_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(story.created_at, now());
    }

    #[tokio::test]
    async fn update_of_foreign_story_is_not_found_and_not_saved() {
        let story = Story::new(UserId::new(), "Theirs", now());
        let story_id = story.id;
        let mut stories = MockStoryRepo::new();
        stories
            .expect_get()
            .returning(move |_| Ok(Some(story.clone())));
        stories.expect_save().never();

        let result = ops(stories)
            .update(UserId::new(), story_id, UpdateStoryRequest::default())
            .await;
        assert!(matches!(result, Err(StoryError::NotFound)));
    }

    #[tokio::test]
    async fn update_applies_patch_and_clears_cover() {
        let story = Story::new(UserId::new(), "Old", now()).with_cover_image("/uploads/a.png");
        let author = story.author_id;
        let story_id = story.id;
        let mut stories = MockStoryRepo::new();
        stories
            .expect_get()
            .returning(move |_| Ok(Some(story.clone())));
        stories.expect_save().times(1).returning(|_| Ok(()));

        let updated = ops(stories)
            .update(
                author,
                story_id,
                UpdateStoryRequest {
                    title: Some("New".into()),
                    content: Some("one two".into()),
                    published: Some(true),
                    cover_image_url: Some(String::new()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.word_count, 2);
        assert!(updated.published);
        assert_eq!(updated.cover_image_url, None);
    }

    #[tokio::test]
    async fn library_caps_limit_and_computes_offset() {
        let mut stories = MockStoryRepo::new();
        stories
            .expect_list_published()
            .withf(|f| {
                f.limit == MAX_LIBRARY_LIMIT
                    && f.offset == 100
                    && f.kind == StoryKind::Interactive
                    && f.search.as_deref() == Some("dragon")
            })
            .returning(|_| Ok((vec![], 120)));

        let page = ops(stories)
            .library(LibraryQuery {
                page: Some(3),
                limit: Some(500),
                kind: Some("interactive".into()),
                search: Some("dragon".into()),
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 120);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn library_defaults() {
        let mut stories = MockStoryRepo::new();
        stories
            .expect_list_published()
            .withf(|f| f.limit == 12 && f.offset == 0 && f.kind == StoryKind::All && f.search.is_none())
            .returning(|_| Ok((vec![], 0)));

        let page = ops(stories).library(LibraryQuery::default()).await.unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.total_pages, 0);
    }
}
