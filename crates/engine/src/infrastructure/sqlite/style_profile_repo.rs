//! SQLite style-profile repository (one row per user).

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{StyleProfile, UserId};

use super::helpers::{encode_json, encode_time, RowExt};
use crate::infrastructure::ports::{RepoError, StyleProfileRepo};

pub struct SqliteStyleProfileRepo {
    pool: SqlitePool,
}

impl SqliteStyleProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: &SqliteRow) -> Result<StyleProfile, RepoError> {
    let confidence: f64 = row.col("confidence")?;
    Ok(StyleProfile {
        user_id: row.parsed("user_id")?,
        confidence: confidence as f32,
        metrics: row.json("metrics_json")?,
        voice: row.json("voice_json")?,
        stories_analyzed: row.count("stories_analyzed")?,
        words_analyzed: row.count("words_analyzed")?,
        created_at: row.time("created_at")?,
        updated_at: row.time("updated_at")?,
    })
}

#[async_trait]
impl StyleProfileRepo for SqliteStyleProfileRepo {
    async fn get(&self, user_id: UserId) -> Result<Option<StyleProfile>, RepoError> {
        let row = sqlx::query(
            "SELECT user_id, confidence, metrics_json, voice_json, stories_analyzed, \
             words_analyzed, created_at, updated_at FROM style_profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_style_profile", e))?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn save(&self, profile: &StyleProfile) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO style_profiles (user_id, confidence, metrics_json, voice_json,
                                        stories_analyzed, words_analyzed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                confidence = excluded.confidence,
                metrics_json = excluded.metrics_json,
                voice_json = excluded.voice_json,
                stories_analyzed = excluded.stories_analyzed,
                words_analyzed = excluded.words_analyzed,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(f64::from(profile.confidence))
        .bind(encode_json(&profile.metrics)?)
        .bind(encode_json(&profile.voice)?)
        .bind(i64::from(profile.stories_analyzed))
        .bind(i64::from(profile.words_analyzed))
        .bind(encode_time(profile.created_at))
        .bind(encode_time(profile.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_style_profile", e))?;

        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM style_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_style_profile", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::test_support::{fixed_time, seeded_user, temp_pool};
    use chrono::Duration;
    use inkworld_domain::{StyleMetrics, StyleVoice};

    fn profile(user_id: UserId, confidence: f32) -> StyleProfile {
        StyleProfile {
            user_id,
            confidence,
            metrics: StyleMetrics {
                avg_sentence_length: 12.5,
                ..StyleMetrics::default()
            },
            voice: StyleVoice {
                tone: "wry".into(),
                ..StyleVoice::default()
            },
            stories_analyzed: 3,
            words_analyzed: 4200,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        }
    }

    #[tokio::test]
    async fn replaces_and_deletes_profiles() {
        let (_dir, pool) = temp_pool().await;
        let user = seeded_user(&pool, "Ada").await;
        let repo = SqliteStyleProfileRepo::new(pool);

        repo.save(&profile(user.id, 0.5)).await.unwrap();
        let mut updated = profile(user.id, 0.75);
        updated.updated_at = fixed_time() + Duration::days(1);
        repo.save(&updated).await.unwrap();

        let stored = repo.get(user.id).await.unwrap().expect("profile");
        assert_eq!(stored, updated);

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get(user.id).await.unwrap().is_none());
    }
}
