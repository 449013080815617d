//! Schema bootstrap - idempotent, run at startup.

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

// NOTE: no unique index on (from_node_id, to_node_id) or on the start node;
// both rules are checked in the use cases and are racy under concurrency.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stories (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        word_count INTEGER NOT NULL DEFAULT 0,
        published INTEGER NOT NULL DEFAULT 0,
        views INTEGER NOT NULL DEFAULT 0,
        likes INTEGER NOT NULL DEFAULT 0,
        cover_image_url TEXT,
        is_interactive INTEGER NOT NULL DEFAULT 0,
        author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS stories_author ON stories(author_id, updated_at)",
    "CREATE INDEX IF NOT EXISTS stories_published ON stories(published, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS story_nodes (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        node_type TEXT NOT NULL,
        is_start INTEGER NOT NULL DEFAULT 0,
        is_ending INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL DEFAULT 0,
        word_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS story_nodes_story ON story_nodes(story_id, position)",
    r#"
    CREATE TABLE IF NOT EXISTS choices (
        id TEXT PRIMARY KEY,
        from_node_id TEXT NOT NULL REFERENCES story_nodes(id) ON DELETE CASCADE,
        to_node_id TEXT NOT NULL REFERENCES story_nodes(id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        emoji TEXT,
        position INTEGER NOT NULL DEFAULT 0,
        times_chosen INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS choices_from ON choices(from_node_id, position)",
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        backstory TEXT NOT NULL DEFAULT '',
        traits_json TEXT NOT NULL DEFAULT '[]',
        personality_json TEXT NOT NULL DEFAULT '{}',
        voice_tone TEXT NOT NULL DEFAULT '',
        emotional_range TEXT NOT NULL DEFAULT '',
        trigger_topics_json TEXT NOT NULL DEFAULT '[]',
        trigger_words_json TEXT NOT NULL DEFAULT '[]',
        intervention_enabled INTEGER NOT NULL DEFAULT 0,
        intervention_style TEXT NOT NULL,
        intervention_frequency TEXT NOT NULL,
        total_interventions INTEGER NOT NULL DEFAULT 0,
        last_intervention TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS story_characters (
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        character_id TEXT NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        PRIMARY KEY (story_id, character_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS style_profiles (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        confidence REAL NOT NULL,
        metrics_json TEXT NOT NULL,
        voice_json TEXT NOT NULL,
        stories_analyzed INTEGER NOT NULL,
        words_analyzed INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }

    tracing::info!("SQLite schema initialized (tables and indexes ensured)");
    Ok(())
}
