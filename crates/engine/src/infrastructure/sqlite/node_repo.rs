//! SQLite story-node repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{NodeId, StoryId, StoryNode};

use super::helpers::{encode_time, RowExt};
use crate::infrastructure::ports::{NodeRepo, RepoError};

const NODE_COLUMNS: &str = "id, story_id, title, content, node_type, is_start, is_ending, \
     position, word_count, created_at, updated_at";

pub struct SqliteNodeRepo {
    pool: SqlitePool,
}

impl SqliteNodeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_node(row: &SqliteRow) -> Result<StoryNode, RepoError> {
    Ok(StoryNode {
        id: row.parsed("id")?,
        story_id: row.parsed("story_id")?,
        title: row.col("title")?,
        content: row.col("content")?,
        node_type: row.parsed("node_type")?,
        is_start: row.col("is_start")?,
        is_ending: row.col("is_ending")?,
        position: row.col("position")?,
        word_count: row.count("word_count")?,
        created_at: row.time("created_at")?,
        updated_at: row.time("updated_at")?,
    })
}

#[async_trait]
impl NodeRepo for SqliteNodeRepo {
    async fn get(&self, id: NodeId) -> Result<Option<StoryNode>, RepoError> {
        let sql = format!("SELECT {} FROM story_nodes WHERE id = ?", NODE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_node", e))?;

        row.as_ref().map(row_to_node).transpose()
    }

    async fn save(&self, node: &StoryNode) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO story_nodes (id, story_id, title, content, node_type, is_start, is_ending,
                                     position, word_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                node_type = excluded.node_type,
                is_start = excluded.is_start,
                is_ending = excluded.is_ending,
                position = excluded.position,
                word_count = excluded.word_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(node.id.to_string())
        .bind(node.story_id.to_string())
        .bind(&node.title)
        .bind(&node.content)
        .bind(node.node_type.as_str())
        .bind(node.is_start)
        .bind(node.is_ending)
        .bind(node.position)
        .bind(i64::from(node.word_count))
        .bind(encode_time(node.created_at))
        .bind(encode_time(node.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_node", e))?;

        Ok(())
    }

    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<StoryNode>, RepoError> {
        let sql = format!(
            "SELECT {} FROM story_nodes WHERE story_id = ? ORDER BY position ASC, created_at ASC",
            NODE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_nodes", e))?;

        rows.iter().map(row_to_node).collect()
    }

    async fn count_for_story(&self, story_id: StoryId) -> Result<u32, RepoError> {
        sqlx::query("SELECT COUNT(*) AS total FROM story_nodes WHERE story_id = ?")
            .bind(story_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_nodes", e))?
            .count("total")
    }

    async fn clear_start(&self, story_id: StoryId, now: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE story_nodes SET is_start = 0, updated_at = ? WHERE story_id = ? AND is_start = 1",
        )
        .bind(encode_time(now))
        .bind(story_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("clear_start_node", e))?;
        Ok(())
    }
}
