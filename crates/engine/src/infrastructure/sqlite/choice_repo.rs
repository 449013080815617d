//! SQLite choice (graph edge) repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{Choice, ChoiceId, NodeId, StoryId};

use super::helpers::{encode_time, RowExt};
use crate::infrastructure::ports::{ChoiceRepo, RepoError};

const CHOICE_COLUMNS: &str =
    "c.id, c.from_node_id, c.to_node_id, c.text, c.emoji, c.position, c.times_chosen, c.created_at";

pub struct SqliteChoiceRepo {
    pool: SqlitePool,
}

impl SqliteChoiceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_choice(row: &SqliteRow) -> Result<Choice, RepoError> {
    Ok(Choice {
        id: row.parsed("id")?,
        from_node_id: row.parsed("from_node_id")?,
        to_node_id: row.parsed("to_node_id")?,
        text: row.col("text")?,
        emoji: row.col("emoji")?,
        position: row.col("position")?,
        times_chosen: row.count("times_chosen")?,
        created_at: row.time("created_at")?,
    })
}

#[async_trait]
impl ChoiceRepo for SqliteChoiceRepo {
    async fn get(&self, id: ChoiceId) -> Result<Option<Choice>, RepoError> {
        let sql = format!("SELECT {} FROM choices c WHERE c.id = ?", CHOICE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_choice", e))?;

        row.as_ref().map(row_to_choice).transpose()
    }

    async fn save(&self, choice: &Choice) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO choices (id, from_node_id, to_node_id, text, emoji, position,
                                 times_chosen, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                to_node_id = excluded.to_node_id,
                text = excluded.text,
                emoji = excluded.emoji,
                position = excluded.position
            "#,
        )
        .bind(choice.id.to_string())
        .bind(choice.from_node_id.to_string())
        .bind(choice.to_node_id.to_string())
        .bind(&choice.text)
        .bind(choice.emoji.as_deref())
        .bind(choice.position)
        .bind(i64::from(choice.times_chosen))
        .bind(encode_time(choice.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_choice", e))?;

        Ok(())
    }

    async fn delete(&self, id: ChoiceId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM choices WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_choice", e))?;
        Ok(())
    }

    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Choice>, RepoError> {
        let sql = format!(
            "SELECT {} FROM choices c JOIN story_nodes n ON n.id = c.from_node_id \
             WHERE n.story_id = ? ORDER BY c.position ASC, c.created_at ASC",
            CHOICE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_choices", e))?;

        rows.iter().map(row_to_choice).collect()
    }

    async fn exists_between(&self, from: NodeId, to: NodeId) -> Result<bool, RepoError> {
        let row = sqlx::query("SELECT 1 AS hit FROM choices WHERE from_node_id = ? AND to_node_id = ? LIMIT 1")
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("choice_exists", e))?;
        Ok(row.is_some())
    }

    async fn increment_times_chosen(&self, id: ChoiceId) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE choices SET times_chosen = times_chosen + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("record_choice_taken", e))?;
        Ok(result.rows_affected() > 0)
    }
}
