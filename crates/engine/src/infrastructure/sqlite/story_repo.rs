//! SQLite story repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{LibraryEntry, Story, StoryId, StoryKind, UserId};

use super::helpers::{encode_time, RowExt};
use crate::infrastructure::ports::{LibraryFilter, RepoError, StoryRepo};

const STORY_COLUMNS: &str = "s.id, s.title, s.content, s.word_count, s.published, s.views, \
     s.likes, s.cover_image_url, s.is_interactive, s.author_id, s.created_at, s.updated_at";

pub struct SqliteStoryRepo {
    pool: SqlitePool,
}

impl SqliteStoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_story(row: &SqliteRow) -> Result<Story, RepoError> {
    Ok(Story {
        id: row.parsed("id")?,
        title: row.col("title")?,
        content: row.col("content")?,
        word_count: row.count("word_count")?,
        published: row.col("published")?,
        views: row.count("views")?,
        likes: row.count("likes")?,
        cover_image_url: row.col("cover_image_url")?,
        is_interactive: row.col("is_interactive")?,
        author_id: row.parsed("author_id")?,
        created_at: row.time("created_at")?,
        updated_at: row.time("updated_at")?,
    })
}

/// WHERE clause for the library plus its positional bind values.
fn library_where(filter: &LibraryFilter) -> (String, Vec<String>) {
    let mut clause = String::from("WHERE s.published = 1");
    let mut binds = Vec::new();

    match filter.kind {
        StoryKind::All => {}
        StoryKind::Interactive => clause.push_str(" AND s.is_interactive = 1"),
        StoryKind::Linear => clause.push_str(" AND s.is_interactive = 0"),
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        clause.push_str(
            " AND (LOWER(s.title) LIKE ? ESCAPE '\\' OR LOWER(s.content) LIKE ? ESCAPE '\\')",
        );
        // SQLite's LOWER only folds ASCII, so the pattern is folded the same way.
        let pattern = format!("%{}%", escape_like(&search.to_ascii_lowercase()));
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    (clause, binds)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl StoryRepo for SqliteStoryRepo {
    async fn get(&self, id: StoryId) -> Result<Option<Story>, RepoError> {
        let sql = format!("SELECT {} FROM stories s WHERE s.id = ?", STORY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_story", e))?;

        row.as_ref().map(row_to_story).transpose()
    }

    async fn save(&self, story: &Story) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO stories (id, title, content, word_count, published, views, likes,
                                 cover_image_url, is_interactive, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                word_count = excluded.word_count,
                published = excluded.published,
                views = excluded.views,
                likes = excluded.likes,
                cover_image_url = excluded.cover_image_url,
                is_interactive = excluded.is_interactive,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(story.id.to_string())
        .bind(&story.title)
        .bind(&story.content)
        .bind(i64::from(story.word_count))
        .bind(story.published)
        .bind(i64::from(story.views))
        .bind(i64::from(story.likes))
        .bind(story.cover_image_url.as_deref())
        .bind(story.is_interactive)
        .bind(story.author_id.to_string())
        .bind(encode_time(story.created_at))
        .bind(encode_time(story.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_story", e))?;

        Ok(())
    }

    async fn delete(&self, id: StoryId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_story", e))?;
        Ok(())
    }

    async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Story>, RepoError> {
        let sql = format!(
            "SELECT {} FROM stories s WHERE s.author_id = ? ORDER BY s.updated_at DESC",
            STORY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(author_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_stories_by_author", e))?;

        rows.iter().map(row_to_story).collect()
    }

    async fn list_published(
        &self,
        filter: &LibraryFilter,
    ) -> Result<(Vec<LibraryEntry>, u32), RepoError> {
        let (clause, binds) = library_where(filter);

        let count_sql = format!("SELECT COUNT(*) AS total FROM stories s {}", clause);
        let mut count_query = sqlx::query(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_library", e))?
            .count("total")?;

        let page_sql = format!(
            "SELECT {}, u.name AS author_name FROM stories s \
             JOIN users u ON u.id = s.author_id {} \
             ORDER BY s.created_at DESC LIMIT ? OFFSET ?",
            STORY_COLUMNS, clause
        );
        let mut page_query = sqlx::query(&page_sql);
        for value in &binds {
            page_query = page_query.bind(value);
        }
        let rows = page_query
            .bind(i64::from(filter.limit))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_library", e))?;

        let entries = rows
            .iter()
            .map(|row| {
                Ok(LibraryEntry {
                    story: row_to_story(row)?,
                    author_name: row.col("author_name")?,
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;

        Ok((entries, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::test_support::{fixed_time, seeded_user, temp_pool};
    use chrono::Duration;

    fn filter(kind: StoryKind, search: Option<&str>) -> LibraryFilter {
        LibraryFilter {
            kind,
            search: search.map(String::from),
            offset: 0,
            limit: 12,
        }
    }

    #[tokio::test]
    async fn saves_and_updates_stories() {
        let (_dir, pool) = temp_pool().await;
        let author = seeded_user(&pool, "Ada").await;
        let repo = SqliteStoryRepo::new(pool);

        let mut story = Story::new(author.id, "Draft", fixed_time()).with_content("<p>one two</p>");
        repo.save(&story).await.expect("insert");

        story.update_content("one two three", fixed_time() + Duration::minutes(1));
        story.set_published(true, fixed_time() + Duration::minutes(1));
        repo.save(&story).await.expect("update");

        let loaded = repo.get(story.id).await.unwrap().expect("story");
        assert_eq!(loaded, story);
        assert_eq!(loaded.word_count, 3);

        repo.delete(story.id).await.expect("delete");
        assert!(repo.get(story.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_author_stories_most_recently_updated_first() {
        let (_dir, pool) = temp_pool().await;
        let author = seeded_user(&pool, "Ada").await;
        let other = seeded_user(&pool, "Bo").await;
        let repo = SqliteStoryRepo::new(pool);

        let older = Story::new(author.id, "Older", fixed_time());
        let mut newer = Story::new(author.id, "Newer", fixed_time());
        newer.rename("Newer", fixed_time() + Duration::hours(1));
        let foreign = Story::new(other.id, "Foreign", fixed_time());
        for story in [&older, &newer, &foreign] {
            repo.save(story).await.unwrap();
        }

        let titles: Vec<_> = repo
            .list_by_author(author.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn library_filters_published_by_kind_and_search() {
        let (_dir, pool) = temp_pool().await;
        let author = seeded_user(&pool, "Ada").await;
        let repo = SqliteStoryRepo::new(pool);

        let mut dragon = Story::new(author.id, "The Dragon", fixed_time()).with_content("fire");
        dragon.set_published(true, fixed_time());
        let mut maze = Story::new(author.id, "Maze", fixed_time() + Duration::minutes(1))
            .with_content("a DRAGON waits");
        maze.set_published(true, fixed_time());
        maze.mark_interactive(fixed_time());
        let draft = Story::new(author.id, "Dragon draft", fixed_time());
        for story in [&dragon, &maze, &draft] {
            repo.save(story).await.unwrap();
        }

        let (entries, total) = repo
            .list_published(&filter(StoryKind::All, Some("dragon")))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(entries[0].story.title, "Maze");
        assert_eq!(entries[0].author_name, "Ada");

        let (entries, total) = repo
            .list_published(&filter(StoryKind::Linear, None))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].story.id, dragon.id);

        let mut paged = filter(StoryKind::All, None);
        paged.limit = 1;
        paged.offset = 1;
        let (entries, total) = repo.list_published(&paged).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].story.id, dragon.id);
    }

    #[tokio::test]
    async fn library_search_treats_wildcards_literally() {
        let (_dir, pool) = temp_pool().await;
        let author = seeded_user(&pool, "Ada").await;
        let repo = SqliteStoryRepo::new(pool);

        let mut percent = Story::new(author.id, "100% Real", fixed_time()).with_content("true");
        percent.set_published(true, fixed_time());
        let mut plain = Story::new(author.id, "Snake_Case", fixed_time()).with_content("words");
        plain.set_published(true, fixed_time());
        let mut other = Story::new(author.id, "Another", fixed_time()).with_content("nothing");
        other.set_published(true, fixed_time());
        for story in [&percent, &plain, &other] {
            repo.save(story).await.unwrap();
        }

        let (entries, total) = repo
            .list_published(&filter(StoryKind::All, Some("%")))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].story.id, percent.id);

        let (entries, total) = repo
            .list_published(&filter(StoryKind::All, Some("E_C")))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].story.id, plain.id);

        let (_, total) = repo
            .list_published(&filter(StoryKind::All, Some("a_o")))
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn like_escaping_covers_the_escape_character() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }
}
