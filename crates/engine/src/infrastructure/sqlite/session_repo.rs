//! SQLite session lookup.
//!
//! Users and sessions are created by the sign-in flow, which lives outside
//! this service; the insert helpers exist for seeding and tests.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use inkworld_domain::{Session, User, UserId};

use super::helpers::{encode_time, RowExt};
use crate::infrastructure::ports::{RepoError, SessionRepo};

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(encode_time(user.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("insert_user", e))?;
        Ok(())
    }

    pub async fn insert_session(&self, session: &Session) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(session.user_id.to_string())
            .bind(encode_time(session.expires_at))
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("insert_session", e))?;
        Ok(())
    }
}

fn row_to_session(row: &SqliteRow) -> Result<Session, RepoError> {
    Ok(Session {
        token: row.col("token")?,
        user_id: row.parsed("user_id")?,
        expires_at: row.time("expires_at")?,
    })
}

fn row_to_user(row: &SqliteRow) -> Result<User, RepoError> {
    Ok(User {
        id: row.parsed("id")?,
        name: row.col("name")?,
        email: row.col("email")?,
        created_at: row.time("created_at")?,
    })
}

#[async_trait]
impl SessionRepo for SqliteSessionRepo {
    async fn get_session(&self, token: &str) -> Result<Option<Session>, RepoError> {
        let row = sqlx::query("SELECT token, user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_session", e))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_user", e))?;

        row.as_ref().map(row_to_user).transpose()
    }
}
