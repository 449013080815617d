//! Session authentication extractors.
//!
//! A request is authenticated when it carries a session token, either as
//! `Authorization: Bearer <token>` or as the `session_token` cookie, and the
//! token resolves to an unexpired session.
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     format!("Hello, {}", user.name)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use inkworld_domain::User;

use super::error::ApiError;
use crate::app::App;

pub const SESSION_COOKIE: &str = "session_token";

/// The signed-in user. Rejects with 401 when there is no valid session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The signed-in user, if any. Never rejects on a missing or stale session.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<Arc<App>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &Arc<App>) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ApiError::Unauthorized)?;
        resolve_user(app, &token)
            .await
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

impl FromRequestParts<Arc<App>> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &Arc<App>) -> Result<Self, Self::Rejection> {
        let user = match session_token(parts) {
            Some(token) => resolve_user(app, &token).await,
            None => None,
        };
        Ok(OptionalUser(user))
    }
}

/// Bearer header first, then the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Storage failures are logged and treated as "no session".
async fn resolve_user(app: &App, token: &str) -> Option<User> {
    let session = match app.sessions.get_session(token).await {
        Ok(Some(session)) if session.is_valid_at(app.clock.now()) => session,
        Ok(_) => return None,
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            return None;
        }
    };

    match app.sessions.get_user(session.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user_id, "Session user lookup failed");
            None
        }
    }
}
