//! SQLite database implementations.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

use crate::infrastructure::ports::RepoError;

mod helpers;
mod schema;

mod character_repo;
mod choice_repo;
mod node_repo;
mod session_repo;
mod story_repo;
mod style_profile_repo;

pub use character_repo::SqliteCharacterRepo;
pub use choice_repo::SqliteChoiceRepo;
pub use node_repo::SqliteNodeRepo;
pub use schema::ensure_schema;
pub use session_repo::SqliteSessionRepo;
pub use story_repo::SqliteStoryRepo;
pub use style_profile_repo::SqliteStyleProfileRepo;

/// Open a pool with foreign keys enforced, creating the file if needed.
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RepoError::database("connect", e))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

/// Create all SQLite repositories from one pool.
pub struct SqliteRepositories {
    pub session: Arc<SqliteSessionRepo>,
    pub story: Arc<SqliteStoryRepo>,
    pub node: Arc<SqliteNodeRepo>,
    pub choice: Arc<SqliteChoiceRepo>,
    pub character: Arc<SqliteCharacterRepo>,
    pub style_profile: Arc<SqliteStyleProfileRepo>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            session: Arc::new(SqliteSessionRepo::new(pool.clone())),
            story: Arc::new(SqliteStoryRepo::new(pool.clone())),
            node: Arc::new(SqliteNodeRepo::new(pool.clone())),
            choice: Arc::new(SqliteChoiceRepo::new(pool.clone())),
            character: Arc::new(SqliteCharacterRepo::new(pool.clone())),
            style_profile: Arc::new(SqliteStyleProfileRepo::new(pool)),
        }
    }
}
