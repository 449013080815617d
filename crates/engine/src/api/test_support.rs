//! In-process application wiring for route tests: real SQLite in a temp
//! directory, mocked AI providers, fixed clock and random.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use inkworld_domain::{Session, User};
use sqlx::SqlitePool;

use crate::app::{App, AppPorts};
use crate::infrastructure::blob_store::LocalBlobStore;
use crate::infrastructure::clock::{FixedClock, FixedRandom};
use crate::infrastructure::ports::{MockAssistantPort, MockLlmPort, MockSpeechPort};
use crate::infrastructure::sqlite::test_support::{fixed_time, seeded_user, temp_pool};
use crate::infrastructure::sqlite::{SqliteRepositories, SqliteSessionRepo};

/// Provider mocks; anything left without expectations panics when called.
#[derive(Default)]
pub struct MockAi {
    pub llm: MockLlmPort,
    pub speech: MockSpeechPort,
    pub assistant: MockAssistantPort,
}

pub struct TestApp {
    pub app: Arc<App>,
    pub pool: SqlitePool,
    pub user: User,
    pub token: String,
    pub expired_token: String,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Another signed-in user; returns their bearer token.
    pub async fn add_user(&self, name: &str) -> (User, String) {
        let user = seeded_user(&self.pool, name).await;
        let token = format!("token-{}", name.to_lowercase());
        insert_session(&self.pool, &user, &token, fixed_time() + ChronoDuration::days(1)).await;
        (user, token)
    }
}

pub async fn app_with_session() -> TestApp {
    app_with_ai(MockAi::default()).await
}

pub async fn app_with_ai(ai: MockAi) -> TestApp {
    let (dir, pool) = temp_pool().await;
    let repos = SqliteRepositories::new(pool.clone());

    let ports = AppPorts {
        sessions: repos.session,
        stories: repos.story,
        nodes: repos.node,
        choices: repos.choice,
        characters: repos.character,
        style_profiles: repos.style_profile,
        llm: Arc::new(ai.llm),
        speech: Arc::new(ai.speech),
        assistant: Arc::new(ai.assistant),
        blobs: Arc::new(LocalBlobStore::new(dir.path().join("uploads"), "/uploads")),
        clock: Arc::new(FixedClock(fixed_time())),
        random: Arc::new(FixedRandom(1)),
    };
    let app = Arc::new(App::new(ports, Duration::from_millis(1)));

    let user = seeded_user(&pool, "Ada").await;
    let token = "token-ada".to_string();
    let expired_token = "token-ada-expired".to_string();
    insert_session(&pool, &user, &token, fixed_time() + ChronoDuration::days(1)).await;
    insert_session(&pool, &user, &expired_token, fixed_time() - ChronoDuration::hours(1)).await;

    TestApp {
        app,
        pool,
        user,
        token,
        expired_token,
        _dir: dir,
    }
}

async fn insert_session(
    pool: &SqlitePool,
    user: &User,
    token: &str,
    expires_at: chrono::DateTime<chrono::Utc>,
) {
    let session = Session {
        token: token.to_string(),
        user_id: user.id,
        expires_at,
    };
    SqliteSessionRepo::new(pool.clone())
        .insert_session(&session)
        .await
        .expect("insert session");
}
