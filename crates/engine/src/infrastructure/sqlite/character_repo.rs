//! SQLite character repository.
//!
//! List-valued fields and the personality block are stored as JSON columns;
//! story links live in `story_characters`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{Character, CharacterId, StoryId, UserId};

use super::helpers::{encode_json, encode_time, RowExt};
use crate::infrastructure::ports::{CharacterRepo, RepoError};

const CHARACTER_COLUMNS: &str = "c.id, c.author_id, c.name, c.backstory, c.traits_json, \
     c.personality_json, c.voice_tone, c.emotional_range, c.trigger_topics_json, \
     c.trigger_words_json, c.intervention_enabled, c.intervention_style, \
     c.intervention_frequency, c.total_interventions, c.last_intervention, c.created_at, \
     c.updated_at";

pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_character(row: &SqliteRow) -> Result<Character, RepoError> {
    Ok(Character {
        id: row.parsed("id")?,
        author_id: row.parsed("author_id")?,
        name: row.col("name")?,
        backstory: row.col("backstory")?,
        traits: row.json("traits_json")?,
        personality: row.json("personality_json")?,
        voice_tone: row.col("voice_tone")?,
        emotional_range: row.col("emotional_range")?,
        trigger_topics: row.json("trigger_topics_json")?,
        trigger_words: row.json("trigger_words_json")?,
        intervention_enabled: row.col("intervention_enabled")?,
        intervention_style: row.parsed("intervention_style")?,
        intervention_frequency: row.parsed("intervention_frequency")?,
        total_interventions: row.count("total_interventions")?,
        last_intervention: row.optional_time("last_intervention")?,
        created_at: row.time("created_at")?,
        updated_at: row.time("updated_at")?,
    })
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO characters (id, author_id, name, backstory, traits_json, personality_json,
                                    voice_tone, emotional_range, trigger_topics_json,
                                    trigger_words_json, intervention_enabled, intervention_style,
                                    intervention_frequency, total_interventions,
                                    last_intervention, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                backstory = excluded.backstory,
                traits_json = excluded.traits_json,
                personality_json = excluded.personality_json,
                voice_tone = excluded.voice_tone,
                emotional_range = excluded.emotional_range,
                trigger_topics_json = excluded.trigger_topics_json,
                trigger_words_json = excluded.trigger_words_json,
                intervention_enabled = excluded.intervention_enabled,
                intervention_style = excluded.intervention_style,
                intervention_frequency = excluded.intervention_frequency,
                total_interventions = excluded.total_interventions,
                last_intervention = excluded.last_intervention,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.author_id.to_string())
        .bind(&character.name)
        .bind(&character.backstory)
        .bind(encode_json(&character.traits)?)
        .bind(encode_json(&character.personality)?)
        .bind(&character.voice_tone)
        .bind(&character.emotional_range)
        .bind(encode_json(&character.trigger_topics)?)
        .bind(encode_json(&character.trigger_words)?)
        .bind(character.intervention_enabled)
        .bind(character.intervention_style.as_str())
        .bind(character.intervention_frequency.as_str())
        .bind(i64::from(character.total_interventions))
        .bind(character.last_intervention.map(encode_time))
        .bind(encode_time(character.created_at))
        .bind(encode_time(character.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_character", e))?;

        Ok(())
    }

    async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Character>, RepoError> {
        let sql = format!(
            "SELECT {} FROM characters c WHERE c.author_id = ? ORDER BY c.created_at DESC",
            CHARACTER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(author_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_characters", e))?;

        rows.iter().map(row_to_character).collect()
    }

    async fn link_story(&self, id: CharacterId, story_id: StoryId) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT OR IGNORE INTO story_characters (story_id, character_id) VALUES (?, ?)",
        )
        .bind(story_id.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("link_character_story", e))?;
        Ok(())
    }

    async fn list_live_for_story(
        &self,
        author_id: UserId,
        story_id: StoryId,
    ) -> Result<Vec<Character>, RepoError> {
        let sql = format!(
            "SELECT {} FROM characters c \
             JOIN story_characters sc ON sc.character_id = c.id \
             WHERE sc.story_id = ? AND c.author_id = ? AND c.intervention_enabled = 1 \
             ORDER BY c.created_at ASC",
            CHARACTER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(story_id.to_string())
            .bind(author_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_live_characters", e))?;

        rows.iter().map(row_to_character).collect()
    }

    async fn record_intervention(
        &self,
        id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE characters SET total_interventions = total_interventions + 1, \
             last_intervention = ?, updated_at = ? WHERE id = ?",
        )
        .bind(encode_time(at))
        .bind(encode_time(at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("record_intervention", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        Ok(())
    }
}
