//! World in Ink Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkworld_engine::api;
use inkworld_engine::app::{App, AppPorts};
use inkworld_engine::infrastructure::{
    blob_store::LocalBlobStore,
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    openai::OpenAiClient,
    sqlite::{self, SqliteRepositories},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkworld_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting World in Ink Engine");

    let config = EngineConfig::from_env();
    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; AI routes will fail");
    }
    if config.openai_assistant_id.is_none() {
        tracing::warn!("OPENAI_ASSISTANT_ID is not set; assistant chat is disabled");
    }

    // Connect to SQLite
    tracing::info!(url = %config.database_url, "Opening database");
    let pool = sqlite::connect(&config.database_url).await?;
    sqlite::ensure_schema(&pool).await?;
    let repos = SqliteRepositories::new(pool);

    // Create infrastructure clients
    let openai = Arc::new(
        OpenAiClient::new(
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
        )
        .with_tts_model(&config.openai_tts_model)
        .with_assistant(config.openai_assistant_id.clone()),
    );
    tracing::info!(
        base_url = %config.openai_base_url,
        model = %config.openai_model,
        "AI provider configured"
    );

    let app = Arc::new(App::new(
        AppPorts {
            sessions: repos.session,
            stories: repos.story,
            nodes: repos.node,
            choices: repos.choice,
            characters: repos.character,
            style_profiles: repos.style_profile,
            llm: openai.clone(),
            speech: openai.clone(),
            assistant: openai,
            blobs: Arc::new(LocalBlobStore::new(
                &config.upload_dir,
                &config.upload_public_base_url,
            )),
            clock: Arc::new(SystemClock),
            random: Arc::new(SystemRandom),
        },
        config.assistant_poll_interval,
    ));

    let mut router = api::http::routes().with_state(app);

    // Uploaded images are served from disk when their public URL is local.
    if config.upload_public_base_url.starts_with('/') && config.upload_public_base_url != "/" {
        router = router.nest_service(
            config.upload_public_base_url.trim_end_matches('/'),
            ServeDir::new(&config.upload_dir),
        );
    }

    let mut router = router.layer(TraceLayer::new_for_http());
    if let Some(cors) = config
        .cors_allowed_origins
        .as_deref()
        .and_then(build_cors_layer)
    {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: &str) -> Option<CorsLayer> {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // Bearer sessions and JSON bodies both trigger preflights.
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
