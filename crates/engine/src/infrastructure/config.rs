//! Engine configuration from environment variables.

use std::time::Duration;

use crate::infrastructure::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, DEFAULT_TTS_MODEL};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:worldink.db";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_tts_model: String,
    pub openai_assistant_id: Option<String>,
    /// Delay between assistant-run status checks
    pub assistant_poll_interval: Duration,
    pub upload_dir: String,
    pub upload_public_base_url: String,
    /// `*` or a comma-separated origin list; unset disables CORS.
    pub cors_allowed_origins: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let poll_ms = var("ASSISTANT_POLL_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        Self {
            database_url: or("DATABASE_URL", DEFAULT_DATABASE_URL),
            server_host: or("SERVER_HOST", "0.0.0.0"),
            server_port,
            openai_base_url: or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_api_key: or("OPENAI_API_KEY", ""),
            openai_model: or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            openai_tts_model: or("OPENAI_TTS_MODEL", DEFAULT_TTS_MODEL),
            openai_assistant_id: var("OPENAI_ASSISTANT_ID"),
            assistant_poll_interval: Duration::from_millis(poll_ms),
            upload_dir: or("UPLOAD_DIR", "uploads"),
            upload_public_base_url: or("UPLOAD_PUBLIC_BASE_URL", "/uploads"),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        }
    }
}
